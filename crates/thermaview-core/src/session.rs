//! Real-time frame streaming via BLE notifications.
//!
//! This module subscribes to the camera's matrix characteristic, feeds
//! each 16-byte notification through a [`MatrixAssembler`], and delivers
//! completed frames as an async stream.
//!
//! The stream supports graceful shutdown via [`FrameStream::close`], which
//! unsubscribes from the characteristic and cancels delivery.
//!
//! [`MatrixAssembler`]: thermaview_types::MatrixAssembler

use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use futures::stream::Stream;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use thermaview_types::uuids::MATRIX_STREAM;
use thermaview_types::{MatrixAssembler, ThermalMatrix};

use crate::device::Device;
use crate::error::{Error, Result};

/// Result type for stream items.
pub type FrameResult = std::result::Result<ThermalMatrix, Error>;

/// Options for frame sessions.
///
/// Use the builder pattern for convenient configuration:
///
/// ```
/// use thermaview_core::session::SessionOptions;
///
/// let options = SessionOptions::builder()
///     .buffer_size(32)
///     .include_errors(true)
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Buffer size for the frame channel.
    /// Default: 16 frames.
    pub buffer_size: usize,
    /// Whether to include packet decode failures in the stream.
    ///
    /// When `false` (default), decode errors are logged but not sent to
    /// the stream. When `true`, they are sent as `Err(Error)` items. A
    /// decode error never invalidates the frame being assembled.
    pub include_errors: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            buffer_size: 16,
            include_errors: false,
        }
    }
}

impl SessionOptions {
    /// Create a new builder for SessionOptions.
    pub fn builder() -> SessionOptionsBuilder {
        SessionOptionsBuilder::default()
    }

    /// Validate the options and return an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if self.buffer_size == 0 {
            return Err(Error::invalid_config("buffer_size must be > 0"));
        }
        Ok(())
    }
}

/// Builder for SessionOptions.
#[derive(Debug, Clone, Default)]
pub struct SessionOptionsBuilder {
    options: SessionOptions,
}

impl SessionOptionsBuilder {
    /// Set the buffer size.
    #[must_use]
    pub fn buffer_size(mut self, size: usize) -> Self {
        self.options.buffer_size = size;
        self
    }

    /// Set whether to include decode errors in the stream.
    #[must_use]
    pub fn include_errors(mut self, include: bool) -> Self {
        self.options.include_errors = include;
        self
    }

    /// Build the SessionOptions.
    #[must_use]
    pub fn build(self) -> SessionOptions {
        self.options
    }
}

/// A stream of completed thermal frames from a connected camera.
///
/// Each `FrameStream` owns exactly one [`MatrixAssembler`]; streams from
/// different devices never share assembly state. Frames are delivered
/// fire-and-forget: when the channel buffer is full the newest frame is
/// dropped rather than blocking the notification handler.
///
/// [`MatrixAssembler`]: thermaview_types::MatrixAssembler
pub struct FrameStream {
    receiver: mpsc::Receiver<FrameResult>,
    device: Arc<Device>,
    cancel_token: CancellationToken,
}

impl FrameStream {
    /// Open a frame stream on a connected device.
    ///
    /// Subscribes to the matrix characteristic and starts assembling
    /// frames. The returned stream yields one `ThermalMatrix` per
    /// completed four-packet run.
    ///
    /// # Errors
    ///
    /// Returns an error if the options are invalid or if the matrix
    /// characteristic is missing or cannot be subscribed to.
    pub async fn open(device: Arc<Device>, options: SessionOptions) -> Result<Self> {
        options.validate()?;

        let (tx, rx) = mpsc::channel(options.buffer_size);
        let cancel_token = CancellationToken::new();
        let task_token = cancel_token.clone();
        let include_errors = options.include_errors;

        // One assembler per session. The notification callback is sync,
        // so the assembler sits behind a std mutex rather than a tokio one.
        let assembler = Mutex::new(MatrixAssembler::new());

        device
            .subscribe_to_notifications(MATRIX_STREAM, move |data| {
                if task_token.is_cancelled() {
                    return;
                }

                let outcome = {
                    let mut assembler = match assembler.lock() {
                        Ok(guard) => guard,
                        Err(poisoned) => poisoned.into_inner(),
                    };
                    let outcome = assembler.ingest(data);
                    if let Ok(Some(_)) = outcome {
                        let missing = assembler.missing_row_pairs();
                        if missing > 0 {
                            debug!(missing, "frame completed with carried-over row pairs");
                        }
                    }
                    outcome
                };

                match outcome {
                    Ok(Some(matrix)) => {
                        // Fire-and-forget: drop the frame when the consumer
                        // is behind.
                        if let Err(e) = tx.try_send(Ok(matrix)) {
                            debug!("dropping completed frame: {}", e);
                        }
                    }
                    Ok(None) => {}
                    Err(e) => {
                        warn!("failed to decode notification packet: {}", e);
                        if include_errors {
                            let _ = tx.try_send(Err(e.into()));
                        }
                    }
                }
            })
            .await?;

        Ok(Self {
            receiver: rx,
            device,
            cancel_token,
        })
    }

    /// Close the stream gracefully.
    ///
    /// Unsubscribes from the matrix characteristic and stops delivering
    /// frames. Prefer this over dropping the stream, which cancels
    /// delivery but leaves the subscription active until disconnect.
    pub async fn close(self) -> Result<()> {
        self.cancel_token.cancel();
        self.device
            .unsubscribe_from_notifications(MATRIX_STREAM)
            .await
    }

    /// Get a cancellation token that can be used to cancel the stream
    /// externally.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    /// Check if the stream has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancel_token.is_cancelled()
    }

    /// The device this stream is reading from.
    pub fn device(&self) -> &Arc<Device> {
        &self.device
    }
}

impl Drop for FrameStream {
    fn drop(&mut self) {
        // Stop feeding the channel if the stream is dropped without close().
        self.cancel_token.cancel();
    }
}

impl Stream for FrameStream {
    type Item = FrameResult;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.receiver).poll_recv(cx)
    }
}

/// Extension trait for Device to open frame streams.
///
/// Requires `Arc<Self>` because the notification handler needs a device
/// reference that outlives the method call.
pub trait DeviceFrameExt {
    /// Open a frame stream with default options.
    fn frames(self: Arc<Self>) -> impl Future<Output = Result<FrameStream>> + Send;

    /// Open a frame stream with custom options.
    fn frames_with_options(
        self: Arc<Self>,
        options: SessionOptions,
    ) -> impl Future<Output = Result<FrameStream>> + Send;
}

impl DeviceFrameExt for Device {
    async fn frames(self: Arc<Self>) -> Result<FrameStream> {
        FrameStream::open(self, SessionOptions::default()).await
    }

    async fn frames_with_options(self: Arc<Self>, options: SessionOptions) -> Result<FrameStream> {
        FrameStream::open(self, options).await
    }
}
