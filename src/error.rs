use std::path::PathBuf;

use thiserror::Error;

/// Startup failures. All of these are fatal: construction aborts before
/// the frame loop starts, with a diagnostic naming the failed stage.
/// Once the loop is running, per-frame rendering has no error path of
/// its own beyond surface loss (see `Renderer::render`).
#[derive(Debug, Error)]
pub enum Error {
    /// The atlas image is missing, unreadable, or not a decodable format.
    #[error("failed to load atlas image `{path}`: {source}")]
    ResourceLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// The WGSL module failed validation.
    #[error("shader compilation failed ({stage}): {log}")]
    ShaderCompile { stage: &'static str, log: String },

    /// The render pipeline could not be created from a valid module
    /// (interface mismatch between stages, bind groups, or vertex layout).
    #[error("shader pipeline creation failed: {log}")]
    ShaderLink { log: String },

    /// Window surface, adapter, or device creation failed.
    #[error("graphics context initialisation failed: {0}")]
    ContextInit(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_load_names_the_path() {
        let err = Error::ResourceLoad {
            path: PathBuf::from("resources/missing.png"),
            source: image::ImageError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "no such file",
            )),
        };
        let msg = err.to_string();
        assert!(msg.contains("resources/missing.png"), "got: {msg}");
    }

    #[test]
    fn shader_errors_name_their_stage() {
        let compile = Error::ShaderCompile { stage: "wgsl module", log: "bad token".into() };
        assert!(compile.to_string().contains("wgsl module"));
        assert!(compile.to_string().contains("bad token"));

        let link = Error::ShaderLink { log: "vertex output mismatch".into() };
        assert!(link.to_string().contains("vertex output mismatch"));
    }

    #[test]
    fn context_init_carries_the_detail() {
        let err = Error::ContextInit("no suitable GPU adapter".into());
        assert!(err.to_string().contains("no suitable GPU adapter"));
    }

    #[test]
    fn resource_load_exposes_its_source() {
        use std::error::Error as _;
        let err = Error::ResourceLoad {
            path: PathBuf::from("a.png"),
            source: image::ImageError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "no such file",
            )),
        };
        assert!(err.source().is_some());
    }
}
