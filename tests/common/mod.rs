#![allow(dead_code)]

mod assertions;
mod helpers;
mod test_app;

// Re-export
pub use assertions::{
    assert_attitude_eq, assert_position_eq, assert_state_valid, assert_within_limits,
};

pub use helpers::*;

pub use test_app::{TestApp, TestAppBuilder, FRAME_DT};
