//! Error types for yuletree.
//!
//! The simulation core never fails; everything here belongs to the edges:
//! configuration files, the camera/gesture pathway, GPU setup and the window.

use thiserror::Error;

/// Errors raised while loading or validating a [`SceneConfig`](crate::config::SceneConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read or write the config file.
    #[error("failed to access config file: {0}")]
    Io(#[from] std::io::Error),
    /// The file is not valid JSON for the config schema.
    #[error("failed to parse config: {0}")]
    Json(#[from] serde_json::Error),
    /// The config parsed but describes an unusable scene.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Errors from the camera and hand-tracking pathway.
///
/// None of these are fatal: the gesture pipeline degrades and the scene keeps
/// running on the UI toggle alone.
#[derive(Debug, Error)]
pub enum GestureError {
    /// No camera could be opened.
    #[error("camera unavailable: {0}")]
    CameraUnavailable(String),
    /// The user or platform refused camera access.
    #[error("camera permission denied")]
    PermissionDenied,
    /// The tracker thread went away.
    #[error("gesture source disconnected")]
    Disconnected,
    /// Hand-landmark inference failed.
    #[error("hand inference failed: {0}")]
    Inference(String),
    /// The tracker thread could not be started.
    #[error("failed to start gesture thread: {0}")]
    Thread(#[from] std::io::Error),
    /// Camera or inference resources failed to release.
    #[error("failed to release gesture resources: {0}")]
    Teardown(String),
}

/// Errors that can occur during GPU initialization.
#[derive(Debug, Error)]
pub enum GpuError {
    /// Failed to create a surface for rendering.
    #[error("failed to create GPU surface: {0}")]
    SurfaceCreation(#[from] wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    #[error("no compatible GPU adapter found")]
    NoAdapter,
    /// Failed to create GPU device.
    #[error("failed to create GPU device: {0}")]
    DeviceCreation(#[from] wgpu::RequestDeviceError),
}

/// Errors that end the viewer application.
#[derive(Debug, Error)]
pub enum AppError {
    /// Failed to create event loop.
    #[error("failed to create event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    /// Failed to create window.
    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),
    /// GPU initialization failed.
    #[error("GPU error: {0}")]
    Gpu(#[from] GpuError),
    /// The scene config could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),
}
