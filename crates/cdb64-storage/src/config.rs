//! Writer configuration.

/// Default size of the writer's output buffer (64 KiB)
pub const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

/// Durability of a finalized file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    /// fsync the medium after the header is written
    Sync,
    /// Flush buffers only, leave durability to the OS
    None,
}

/// Options for [`CdbWriter`](crate::CdbWriter)
#[derive(Debug, Clone)]
pub struct WriterConfig {
    /// Capacity of the buffer in front of the medium
    pub buffer_size: usize,
    /// Whether finalize syncs the medium
    pub sync_mode: SyncMode,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
            sync_mode: SyncMode::Sync,
        }
    }
}

impl WriterConfig {
    /// Set the output buffer capacity
    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    /// Set the sync mode
    pub fn with_sync_mode(mut self, sync_mode: SyncMode) -> Self {
        self.sync_mode = sync_mode;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writer_config_default() {
        let config = WriterConfig::default();
        assert_eq!(config.buffer_size, 64 * 1024);
        assert_eq!(config.sync_mode, SyncMode::Sync);
    }

    #[test]
    fn test_writer_config_builders() {
        let config = WriterConfig::default()
            .with_buffer_size(128)
            .with_sync_mode(SyncMode::None);
        assert_eq!(config.buffer_size, 128);
        assert_eq!(config.sync_mode, SyncMode::None);
    }
}
