pub mod control;
pub mod frame_loop;
pub mod peer_sync;
pub mod shared;
pub mod sources;
pub mod strategies;
