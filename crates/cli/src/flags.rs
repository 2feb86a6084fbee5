use clap::ValueEnum;

use crate::config::RunProfile;
use impact_environment::OutputDirStrategy;
use impact_snapshot::CollisionPolicy;

#[derive(Copy, Clone, ValueEnum)]
pub(crate) enum DiscoveryFlag {
    /// `target/classes` and `target/test-classes` under the root
    Explicit,
    /// Every `classes`/`test-classes` directory under the root
    Scan,
}

impl DiscoveryFlag {
    pub(crate) const fn as_domain(self) -> OutputDirStrategy {
        match self {
            DiscoveryFlag::Explicit => OutputDirStrategy::Explicit,
            DiscoveryFlag::Scan => OutputDirStrategy::Scan,
        }
    }
}

#[derive(Copy, Clone, ValueEnum)]
pub(crate) enum ProfileFlag {
    /// Two passes, one snapshot
    WarmUp,
    /// Three passes, plus a snapshot in the working directory
    Comparison,
}

impl ProfileFlag {
    pub(crate) const fn as_domain(self) -> RunProfile {
        match self {
            ProfileFlag::WarmUp => RunProfile::WarmUp,
            ProfileFlag::Comparison => RunProfile::Comparison,
        }
    }
}

#[derive(Copy, Clone, ValueEnum)]
pub(crate) enum CollisionFlag {
    Overwrite,
    Unique,
}

impl CollisionFlag {
    pub(crate) const fn as_domain(self) -> CollisionPolicy {
        match self {
            CollisionFlag::Overwrite => CollisionPolicy::Overwrite,
            CollisionFlag::Unique => CollisionPolicy::Unique,
        }
    }
}
