// src/recipe/mod.rs

//! Recipe discovery and build-kind classification
//!
//! A package is one directory under `pkgs/` holding a `recipe.yaml`, either
//! nested in a `recipe/` subdirectory or at the top level. Discovery walks
//! the tree once per run; the resulting [`Package`] set is immutable for the
//! rest of the run.
//!
//! Each recipe is classified into one of three build kinds by sniffing its
//! literal content (recipes are never executed or fully parsed here):
//!
//! - **NoArch**: platform-independent, one build serves every platform
//! - **Variant**: one recipe fans out into a matrix of platform/config
//!   builds (CUDA versions etc.), sized by `variants.yaml`
//! - **Standard**: a single platform build

mod scanner;
mod variants;

pub use scanner::{classify, discover_packages};
pub use variants::{parse_variant_config, variant_count};

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Build strategy detected from one recipe's content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildKind {
    /// Platform-independent package
    NoArch,
    /// Combinatorial matrix of builds from one recipe
    Variant,
    /// Single platform build
    Standard,
}

impl BuildKind {
    /// Tag used in job specs and CLI keywords
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NoArch => "noarch",
            Self::Variant => "variant",
            Self::Standard => "standard",
        }
    }
}

impl fmt::Display for BuildKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BuildKind {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "noarch" => Ok(Self::NoArch),
            "variant" => Ok(Self::Variant),
            "standard" => Ok(Self::Standard),
            _ => Err(()),
        }
    }
}

/// One buildable package discovered under `pkgs/`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    /// Unique name, taken from the directory name
    pub name: String,
    /// Recipe directory, relative to the repository root
    pub recipe_dir: PathBuf,
    /// Build strategy detected from the recipe content
    pub kind: BuildKind,
}
