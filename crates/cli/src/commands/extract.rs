//! `lawdesk extract` — Print the text extracted from an upload.

use std::path::PathBuf;

use super::read_upload;

pub async fn run(file: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let item = read_upload(&file).await?;
    let document = lawdesk_documents::extract(&item)?;
    println!("{}", document.content);
    Ok(())
}
