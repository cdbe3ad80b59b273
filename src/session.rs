/// Frame-state machine driving the pipeline.
pub mod render_loop;
/// Tick scheduling.
pub mod scheduler;
