// TASK4: Complete memory-safe application initialization system
use super::initialization::InitializationError;
use super::logging_system::setup_logging_safe;
use super::config::{Config, LogLevel};

#[derive(Debug)]
pub struct InitializationResult {
    pub logging_initialized: bool,
    pub config_validated: bool,
    pub initialization_time_ms: u64,
}

pub struct ApplicationInitializer;

impl ApplicationInitializer {
    pub fn new() -> Self {
        Self
    }
    
    /// 段階的初期化（失敗時の詳細情報提供）
    pub fn initialize(&self, config: &Config) -> Result<InitializationResult, InitializationError> {
        let start_time = std::time::Instant::now();
        
        // Phase 1: ログシステムの初期化
        self.initialize_logging(config.log_level)
            .map_err(|e| {
                eprintln!("Failed to initialize logging: {}", e);
                e
            })?;
        
        // Phase 2: 設定検証
        self.validate_configuration(config)
            .map_err(|e| {
                tracing::error!("Configuration validation failed: {}", e);
                e
            })?;
        
        let elapsed = start_time.elapsed();
        tracing::info!("Application initialization completed in {:?}", elapsed);
        
        Ok(InitializationResult {
            logging_initialized: true,
            config_validated: true,
            initialization_time_ms: elapsed.as_millis() as u64,
        })
    }
    
    fn initialize_logging(&self, log_level: LogLevel) -> Result<(), InitializationError> {
        // Use the memory-safe logging setup
        setup_logging_safe(log_level)?;
        
        tracing::info!("Logging system initialized successfully with level: {:?}", log_level);
        Ok(())
    }
    
    pub fn validate_configuration(&self, config: &Config) -> Result<(), InitializationError> {
        // Validate endpoint
        if config.endpoint.is_empty() {
            return Err(InitializationError::ConfigValidationFailed {
                reason: "Endpoint cannot be empty".to_string(),
            });
        }
        
        if !config.endpoint.starts_with("http://") && !config.endpoint.starts_with("https://") {
            return Err(InitializationError::ConfigValidationFailed {
                reason: format!("Invalid endpoint URL: {}", config.endpoint),
            });
        }
        
        // Validate batch size
        if config.batch_size == 0 {
            return Err(InitializationError::ConfigValidationFailed {
                reason: "Batch size must be greater than 0".to_string(),
            });
        }
        
        if config.batch_size > 100_000 {
            return Err(InitializationError::ConfigValidationFailed {
                reason: format!("Batch size too large: {} (max: 100,000)", config.batch_size),
            });
        }
        
        // Validate buffer capacity
        if config.buffer_capacity == 0 {
            return Err(InitializationError::ConfigValidationFailed {
                reason: "Buffer capacity must be greater than 0".to_string(),
            });
        }
        
        // Validate flush interval
        if config.flush_interval_ms == 0 {
            return Err(InitializationError::ConfigValidationFailed {
                reason: "Flush interval must be greater than 0".to_string(),
            });
        }
        
        // Validate connection timeout
        if config.connection_timeout_secs == 0 {
            return Err(InitializationError::ConfigValidationFailed {
                reason: "Connection timeout must be greater than 0".to_string(),
            });
        }
        
        // Validate metrics port if metrics are enabled
        if config.enable_metrics && config.metrics_port == 0 {
            return Err(InitializationError::ConfigValidationFailed {
                reason: format!("Invalid metrics port: {} (must be > 0)", config.metrics_port),
            });
        }
        
        // Validate disk fallback settings
        if config.enable_disk_fallback {
            if config.max_disk_usage_mb == 0 {
                return Err(InitializationError::ConfigValidationFailed {
                    reason: "Max disk usage must be greater than 0 when disk fallback is enabled".to_string(),
                });
            }
            
            if !config.disk_fallback_path.exists() {
                // Try to create the directory
                if let Err(e) = std::fs::create_dir_all(&config.disk_fallback_path) {
                    return Err(InitializationError::ConfigValidationFailed {
                        reason: format!("Cannot create disk fallback directory: {}", e),
                    });
                }
            }
        }
        
        tracing::info!("Configuration validation passed");
        Ok(())
    }
    
    /// 設定に基づく初期化戦略の決定
    pub fn determine_initialization_strategy(&self, config: &Config) -> InitializationStrategy {
        if config.target_service.is_none() {
            InitializationStrategy::AutoDetection
        } else if config.enable_disk_fallback && config.enable_metrics {
            InitializationStrategy::FullFeatures
        } else if config.enable_metrics {
            InitializationStrategy::WithMetrics
        } else {
            InitializationStrategy::Basic
        }
    }
}

impl Default for ApplicationInitializer {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InitializationStrategy {
    Basic,
    WithMetrics,
    FullFeatures,
    AutoDetection,
}
