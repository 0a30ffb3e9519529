//! Model output

mod model_xml;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::EntityGenError;
use crate::model::ExtractedModel;

pub use model_xml::generate_model_xml;

/// Write the model XML to `path`, replacing any existing file
pub fn write_model_file(path: &Path, extracted: &ExtractedModel) -> anyhow::Result<()> {
    let file = File::create(path).map_err(|source| EntityGenError::ModelWriteError {
        path: path.to_path_buf(),
        source,
    })?;

    let mut writer = BufWriter::new(file);
    generate_model_xml(&mut writer, extracted)?;
    writer.flush().map_err(|source| EntityGenError::ModelWriteError {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::debug!(path = %path.display(), "wrote model file");
    Ok(())
}
