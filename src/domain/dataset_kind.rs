// ============================================================
// Layer 3 — DatasetKind
// ============================================================
// The `--dataset` flag. Parsed from its lowercase name so clap can
// use it directly as a value type, and serialised the same way into
// train_config.json.

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetKind {
    Cifar10,
    Lsun,
    Mnist,
    Imagenet,
    Folder,
    Lfw,
    Fake,
}

impl DatasetKind {
    pub const ALL: [DatasetKind; 7] = [
        DatasetKind::Cifar10,
        DatasetKind::Lsun,
        DatasetKind::Mnist,
        DatasetKind::Imagenet,
        DatasetKind::Folder,
        DatasetKind::Lfw,
        DatasetKind::Fake,
    ];

    pub fn name(self) -> &'static str {
        match self {
            DatasetKind::Cifar10  => "cifar10",
            DatasetKind::Lsun     => "lsun",
            DatasetKind::Mnist    => "mnist",
            DatasetKind::Imagenet => "imagenet",
            DatasetKind::Folder   => "folder",
            DatasetKind::Lfw      => "lfw",
            DatasetKind::Fake     => "fake",
        }
    }

    /// Number of image channels the networks are built for
    pub fn channels(self) -> usize {
        match self {
            DatasetKind::Mnist => 1,
            _                  => 3,
        }
    }

    /// Every dataset except the synthetic one is read from `--dataroot`
    pub fn requires_dataroot(self) -> bool {
        self != DatasetKind::Fake
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DatasetKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        DatasetKind::ALL
            .into_iter()
            .find(|kind| kind.name() == lower)
            .ok_or_else(|| {
                let names: Vec<&str> = DatasetKind::ALL.iter().map(|k| k.name()).collect();
                format!("unknown dataset '{s}', expected one of: {}", names.join(", "))
            })
    }
}
