use crate::cli::CompareArgs;
use crate::error::{CliError, Result};
use chromofold::core::io::coords::read_model_from_path;
use chromofold::core::models::Model;
use chromofold::workflows::compare;
use std::path::Path;
use tracing::info;

pub fn run(args: CompareArgs) -> Result<()> {
    let first = load_model(&args.first)?;
    let second = load_model(&args.second)?;

    info!("Invoking the core comparison workflow...");
    let outcome = compare::run(
        &file_label(&args.first),
        &first,
        &file_label(&args.second),
        &second,
    )?;

    println!("{}", outcome);
    Ok(())
}

fn load_model(path: &Path) -> Result<Model> {
    info!("Loading model from {:?}", path);
    read_model_from_path(path).map_err(|e| CliError::FileParsing {
        path: path.to_path_buf(),
        source: e.into(),
    })
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("model")
        .to_string()
}
