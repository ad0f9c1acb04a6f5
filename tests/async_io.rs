//! Async open and save.

#![cfg(feature = "async")]

mod common;

use slidepack::{add_slide, Presentation, SlideContent};
use tempfile::TempDir;

#[tokio::test]
async fn test_open_and_save_async() {
    let dir = TempDir::new().unwrap();
    let template = common::write_template(dir.path());
    let output = dir.path().join("async.pptx");

    let mut prs = Presentation::open_async(&template).await.unwrap();
    let id = add_slide(&mut prs, "title_only", &SlideContent::new().with_title("Async")).unwrap();
    prs.save_async(&output).await.unwrap();

    let reopened = Presentation::open_async(&output).await.unwrap();
    assert_eq!(reopened.slide(id).unwrap().title_text(), Some("Async"));
}
