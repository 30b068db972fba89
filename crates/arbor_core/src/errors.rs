//! Error Types
//!
//! Traversal, drawing and uniform allocation never fail at runtime: programmer
//! errors panic and capacity exhaustion is absorbed by growth. The only
//! fallible surface is the validation of externally loaded data (skins and
//! animation clips) when it is handed to the engine.
//!
//! ```rust,ignore
//! use arbor_core::{ArborError, Result};
//!
//! fn load() -> Result<()> {
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// The main error type for the Arbor engine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ArborError {
    // ========================================================================
    // Skeleton Errors
    // ========================================================================
    /// A joint lists a child index outside of the skin.
    #[error("Joint {joint} references child {child}, but the skin only has {count} joints")]
    JointChildOutOfRange {
        joint: usize,
        child: usize,
        count: usize,
    },

    /// A joint is listed as the child of more than one joint.
    #[error("Joint {joint} has more than one parent")]
    JointMultipleParents { joint: usize },

    /// The joint hierarchy loops back on itself.
    #[error("Joint hierarchy contains a cycle through joint {joint}")]
    JointCycle { joint: usize },

    // ========================================================================
    // Animation Errors
    // ========================================================================
    /// A channel targets a joint that does not exist.
    #[error("Animation '{animation}' channel {channel} targets joint {joint} (skin has {count})")]
    ChannelJointOutOfRange {
        animation: String,
        channel: usize,
        joint: usize,
        count: usize,
    },

    /// A channel has no keyframes.
    #[error("Animation '{animation}' channel {channel} has no keyframes")]
    EmptyChannel { animation: String, channel: usize },

    /// Keyframe times and values disagree in length.
    #[error("Animation '{animation}' channel {channel} has {times} times but {values} values")]
    KeyframeCountMismatch {
        animation: String,
        channel: usize,
        times: usize,
        values: usize,
    },

    /// Keyframe times go backwards.
    #[error("Animation '{animation}' channel {channel} has decreasing input times at keyframe {index}")]
    UnsortedKeyframes {
        animation: String,
        channel: usize,
        index: usize,
    },
}

/// Alias for `Result<T, ArborError>`.
pub type Result<T> = std::result::Result<T, ArborError>;
