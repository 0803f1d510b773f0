//! 配置管理模块
//!
//! 支持多格式配置文件加载，环境变量覆盖，以及类型安全的配置访问。

use config::{Config, ConfigError, Environment, File, Map};
use serde::Deserialize;
use std::path::Path;

/// 规则失败时的处理策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// 第一个失败立即中止本轮评估并返回错误
    #[default]
    FailFast,
    /// 记录失败并继续评估后续规则
    Isolate,
}

/// 规则引擎配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub error_policy: ErrorPolicy,
    /// 是否记录详细评估追踪
    pub trace_enabled: bool,
    /// 是否捕获条件和动作中的 panic 并转换为规则错误
    pub catch_panics: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            error_policy: ErrorPolicy::FailFast,
            trace_enabled: false,
            catch_panics: true,
        }
    }
}

impl EngineConfig {
    pub fn isolated() -> Self {
        Self {
            error_policy: ErrorPolicy::Isolate,
            ..Default::default()
        }
    }

    pub fn with_trace(mut self) -> Self {
        self.trace_enabled = true;
        self
    }
}

/// 可观测性配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub service_name: String,
    pub log_level: String,
    /// 是否启用 JSON 格式日志
    pub json_logs: bool,
    /// 是否注册指标描述（导出由宿主应用负责）
    pub metrics_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            service_name: "fact-rule-engine".to_string(),
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: true,
        }
    }
}

impl ObservabilityConfig {
    pub fn with_service_name(mut self, service_name: &str) -> Self {
        self.service_name = service_name.to_string();
        self
    }
}

/// 应用配置
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    pub service_name: String,
    pub environment: String,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    /// 从配置文件和环境变量加载配置
    ///
    /// 加载顺序（后加载的会覆盖先加载的同名配置项）：
    /// 1. .env 文件（如果存在）
    /// 2. config/default.toml（默认配置）
    /// 3. config/{environment}.toml（环境特定配置）
    /// 4. 环境变量（FACTRULE_ 前缀，如 FACTRULE_ENGINE__ERROR_POLICY -> engine.error_policy）
    pub fn load(service_name: &str) -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let env = std::env::var("FACTRULE_ENV").unwrap_or_else(|_| "development".to_string());
        let config_dir = std::env::var("CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

        Self::load_from(service_name, &env, Path::new(&config_dir))
    }

    /// 从指定目录加载配置
    pub fn load_from(service_name: &str, env: &str, config_dir: &Path) -> Result<Self, ConfigError> {
        Self::load_with_env(service_name, env, config_dir, None)
    }

    /// `env_vars` 为 `None` 时读取进程环境变量
    fn load_with_env(
        service_name: &str,
        env: &str,
        config_dir: &Path,
        env_vars: Option<Map<String, String>>,
    ) -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .set_default("service_name", service_name)?
            .set_default("environment", env)?
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            .add_source(File::from(config_dir.join(format!("{}.toml", env))).required(false))
            // 双下划线分隔层级，单下划线保留给字段名（error_policy）
            .add_source(
                Environment::with_prefix("FACTRULE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .source(env_vars),
            );

        let mut config: Self = builder.build()?.try_deserialize()?;
        config.observability = config.observability.with_service_name(&config.service_name);

        Ok(config)
    }

    /// 是否为生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}
