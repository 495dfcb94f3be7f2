// TASK4: Memory-safe logging system implementation
use super::config::LogLevel as ConfigLogLevel;
use super::initialization::{InitializationError, LogDirective, LogLevel, FallbackStrategy};
use std::sync::Arc;
use parking_lot::RwLock;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

pub struct LoggingSystem {
    directives: Arc<RwLock<Vec<LogDirective>>>,
    fallback_level: LogLevel,
}

impl LoggingSystem {
    pub fn new() -> Self {
        Self {
            directives: Arc::new(RwLock::new(Vec::new())),
            fallback_level: LogLevel::Info,
        }
    }
    
    /// 完全メモリセーフなディレクティブ追加
    pub fn add_directive(&self, directive_str: &str) -> Result<(), InitializationError> {
        match LogDirective::parse(directive_str) {
            Ok(directive) => {
                let mut directives = self.directives.write();
                directives.push(directive);
                Ok(())
            }
            Err(e) => {
                // エラーログ出力（fallback戦略適用）
                match e.fallback_strategy() {
                    FallbackStrategy::UseDefaultLevel => {
                        eprintln!("Warning: {}, using default level", e);
                        self.add_default_directive(directive_str)
                    }
                    FallbackStrategy::SkipDirective => {
                        eprintln!("Warning: {}, skipping directive", e);
                        Ok(())
                    }
                    _ => Err(e),
                }
            }
        }
    }
    
    /// デフォルトレベルでのディレクティブ追加
    fn add_default_directive(&self, directive_str: &str) -> Result<(), InitializationError> {
        let target = directive_str.split('=').next().unwrap_or("unknown");
        let directive = LogDirective::new(target, self.fallback_level);
        
        let mut directives = self.directives.write();
        directives.push(directive);
        Ok(())
    }
    
    /// 型安全なバッチ追加
    pub fn add_default_directives(&self) -> Result<(), InitializationError> {
        let default_directives = &[
            ("hyper", LogLevel::Warn),
            ("reqwest", LogLevel::Warn),
            ("h2", LogLevel::Warn),
            ("tower", LogLevel::Warn),
            ("tonic", LogLevel::Warn),
        ];
        
        for (target, level) in default_directives {
            let directive = LogDirective::new(*target, *level);
            let mut directives = self.directives.write();
            directives.push(directive);
        }
        
        Ok(())
    }
    
    /// メモリセーフなtracing初期化
    pub fn initialize_tracing(&self, default_level: LogLevel) -> Result<(), InitializationError> {
        let filter_string = self.build_filter_string(default_level);
        
        let env_filter = EnvFilter::try_new(&filter_string)
            .map_err(|e| InitializationError::LoggingInitFailed {
                details: format!("Failed to create EnvFilter with '{}'", filter_string),
                source: Box::new(e),
            })?;
        
        let subscriber = tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_level(true)
                    .with_ansi(true)
                    .compact()
            );
        
        tracing::subscriber::set_global_default(subscriber)
            .map_err(|e| InitializationError::LoggingInitFailed {
                details: "Failed to set global tracing subscriber".to_string(),
                source: Box::new(e),
            })?;
        
        Ok(())
    }
    
    /// フィルタ文字列の構築
    pub fn build_filter_string(&self, default_level: LogLevel) -> String {
        let directives = self.directives.read();
        
        if directives.is_empty() {
            return default_level.as_str().to_string();
        }
        
        let mut filter_parts = Vec::with_capacity(directives.len() + 1);
        
        // Default level first
        filter_parts.push(default_level.as_str().to_string());
        
        for directive in directives.iter() {
            filter_parts.push(directive.to_filter_string());
        }
        
        filter_parts.join(",")
    }

    /// 現在のディレクティブ数を取得（テスト用）
    pub fn directive_count(&self) -> usize {
        self.directives.read().len()
    }

    /// ディレクティブをクリア（テスト用）
    pub fn clear_directives(&self) {
        self.directives.write().clear();
    }
}

impl Default for LoggingSystem {
    fn default() -> Self {
        Self::new()
    }
}

// Conversion from config LogLevel to initialization LogLevel
impl From<ConfigLogLevel> for LogLevel {
    fn from(config_level: ConfigLogLevel) -> Self {
        match config_level {
            ConfigLogLevel::Error => LogLevel::Error,
            ConfigLogLevel::Warn => LogLevel::Warn,
            ConfigLogLevel::Info => LogLevel::Info,
            ConfigLogLevel::Debug => LogLevel::Debug,
            ConfigLogLevel::Trace => LogLevel::Trace,
        }
    }
}

// Safe logging setup using the memory-safe logging system
pub fn setup_logging_safe(config_level: ConfigLogLevel) -> Result<(), InitializationError> {
    use std::sync::{Mutex, Once};
    
    static INIT: Once = Once::new();
    static INIT_SUCCESS: Mutex<bool> = Mutex::new(false);
    
    INIT.call_once(|| {
        let logging_system = LoggingSystem::new();
        
        let result: Result<(), InitializationError> = (|| {
            // Add default directives (this replaces the expect() calls)
            logging_system.add_default_directives()?;
            
            // Convert config level to initialization level
            let init_level: LogLevel = config_level.into();
            
            // Initialize tracing with the safe system
            logging_system.initialize_tracing(init_level)?;
            
            Ok(())
        })();
        
        if result.is_ok() {
            *INIT_SUCCESS.lock().unwrap() = true;
        }
    });
    
    // Return the initialization result
    if *INIT_SUCCESS.lock().unwrap() {
        Ok(())
    } else {
        Err(InitializationError::LoggingInitFailed {
            details: "Logging system initialization failed".to_string(),
            source: Box::new(std::io::Error::other("Logging initialization error")),
        })
    }
}
