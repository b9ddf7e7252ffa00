use thiserror::Error;

use crate::selected_file::SelectedFileError;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to build http client: {0}")]
    HttpClient(#[from] reqwest::Error),
    #[error(transparent)]
    SelectedFile(#[from] SelectedFileError),
}
