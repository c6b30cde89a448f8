#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("reading design file {path}: {source}")]
    ReadDesign { path: String, source: std::io::Error },

    #[error("writing design file {path}: {source}")]
    WriteDesign { path: String, source: std::io::Error },

    #[error("parsing design JSON: {0}")]
    ParseDesign(#[from] serde_json::Error),

    #[error("selection matched no modules")]
    EmptySelection,

    #[error("compiling property in module {module}: {source}")]
    Sva { module: String, source: netsynth_sva::SvaError },

    #[error("recovering gate chains in module {module}: {source}")]
    Recover { module: String, source: netsynth_recover::RecoverError },
}
