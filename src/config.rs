//! Static configuration for the assistant.
//!
//! An [`AssistantConfig`] is built once at startup and shared (by `Arc`)
//! with everything that needs it.  Nothing mutates it afterwards.
//!
//! Values come from three layers, highest precedence first: command-line
//! flags (see [`crate::chat::ChatArgs`]), an optional YAML file, and the
//! defaults compiled into the binary.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, Result};
use crate::retry::RetryPolicy;
use crate::transport::DEFAULT_TIMEOUT;
use crate::types::{SystemInstruction, Turn};

/// Endpoint used when none is configured.  Set `NETDOCTOR_ENDPOINT` at build
/// time to bake in a different proxy.
pub const DEFAULT_ENDPOINT: &str = match option_env!("NETDOCTOR_ENDPOINT") {
    Some(endpoint) => endpoint,
    None => "https://proxy-gemini.example.workers.dev/",
};

/// Behavior contract sent as the system instruction of every request.
pub const DEFAULT_SYSTEM_INSTRUCTION: &str = r#"Eres un "Net-Troubleshooter", un ingeniero experto en redes (nivel CCIE/JNCIE) con un enfoque metódico y colaborativo.
Tu único objetivo es guiar a un usuario paso a paso para diagnosticar un problema de red en su "red objetivo".

TU FLUJO DE TRABAJO:

Empezar: Siempre empiezas pidiendo al usuario que describa el síntoma del problema (ej. "No puedo hacer ping a 8.8.8.8", "El servidor web es inaccesible").

Diagnóstico Metódico (Modelo OSI): Basa tu diagnóstico en el modelo OSI. Empieza por la Capa 1/2 (¿Hay enlace?), luego Capa 3 (¿Hay IP, hay ruta?) y así sucesivamente.

UNA PREGUNTA A LA VEZ: Esta es tu regla más importante. NUNCA hagas múltiples preguntas. Haz una sola pregunta o pide un solo comando.

Pedir Comandos: Pide al usuario que ejecute comandos específicos (ej. "Por favor, ejecuta 'ping 192.168.1.1' y pégame la salida", "Muéstrame la salida de 'ipconfig /all'", "Ejecuta un 'traceroute 8.8.8.8'").

Analizar y Repetir: El usuario te dará la salida del comando. Analízala y luego decide cuál es la siguiente pregunta lógica o el siguiente comando a ejecutar.

Concluir: Una vez que tengas suficiente información, proporciona un diagnóstico claro de la causa raíz probable y sugiere una solución o mitigación.

Manejo de Archivos: El usuario puede subir o pegar archivos de configuración (.txt, .log) o salidas de Ansible. Cuando veas un bloque de texto que parezca una configuración de red o un log, úsalo como contexto principal para tu siguiente pregunta de diagnóstico. Analiza el archivo en busca de problemas obvios (ej. IPs incorrectas, ACLs, rutas faltantes) antes de continuar.

Tono: Profesional, técnico, pero amigable. Eres un colega senior ayudando."#;

/// First assistant turn shown before the user types anything.
pub const DEFAULT_GREETING: &str = "Hola, soy Net-Troubleshooter. Estoy aquí para ayudarte a diagnosticar tu problema de red. \n\nPor favor, describe el problema que estás experimentando (ej. 'No puedo acceder al servidor X', 'Internet está lento').";

/// Process-wide static configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct AssistantConfig {
    /// Where requests are posted.
    pub endpoint: Url,

    /// Text of the system instruction sent with every request.
    pub system_instruction: String,

    /// Seed assistant turn.
    pub greeting: String,

    /// Retry behavior for rate-limited and failed attempts.
    pub retry: RetryPolicy,

    /// Timeout for each individual attempt.
    pub timeout: Duration,
}

impl AssistantConfig {
    /// Creates a configuration for `endpoint` with every other value at its
    /// default.
    pub fn new(endpoint: Url) -> Self {
        Self {
            endpoint,
            system_instruction: DEFAULT_SYSTEM_INSTRUCTION.to_string(),
            greeting: DEFAULT_GREETING.to_string(),
            retry: RetryPolicy::default(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Creates the configuration compiled into the binary.
    pub fn from_defaults() -> Result<Self> {
        Ok(Self::new(parse_endpoint(DEFAULT_ENDPOINT)?))
    }

    /// Loads a YAML configuration file on top of the defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = ConfigFile::from_file(path.as_ref())?;
        file.apply(Self::from_defaults()?)
    }

    /// Sets the endpoint.
    pub fn with_endpoint(mut self, endpoint: Url) -> Self {
        self.endpoint = endpoint;
        self
    }

    /// Sets the system instruction text.
    pub fn with_system_instruction(mut self, text: impl Into<String>) -> Self {
        self.system_instruction = text.into();
        self
    }

    /// Sets the greeting.
    pub fn with_greeting(mut self, greeting: impl Into<String>) -> Self {
        self.greeting = greeting.into();
        self
    }

    /// Sets the retry policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Sets the per-attempt timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The system instruction in wire form.
    pub fn system_instruction(&self) -> SystemInstruction {
        SystemInstruction::new(self.system_instruction.clone())
    }

    /// The greeting as a model turn.
    pub fn greeting_turn(&self) -> Turn {
        Turn::model(self.greeting.clone())
    }

    /// Checks the values that cannot be expressed in the types.
    pub fn validate(&self) -> Result<()> {
        if !matches!(self.endpoint.scheme(), "http" | "https") {
            return Err(Error::config(
                format!("endpoint must use http or https, not {}", self.endpoint.scheme()),
                Some("endpoint".to_string()),
            ));
        }
        if self.timeout.is_zero() {
            return Err(Error::config(
                "timeout must be greater than zero",
                Some("timeout_secs".to_string()),
            ));
        }
        if self.retry.initial_delay > self.retry.max_delay {
            return Err(Error::config(
                "initial delay exceeds the maximum delay",
                Some("initial_delay_ms".to_string()),
            ));
        }
        Ok(())
    }
}

/// Parse an endpoint, accepting a bare host by assuming https.
pub fn parse_endpoint(endpoint: &str) -> Result<Url> {
    let endpoint = endpoint.trim();
    if endpoint.contains("://") {
        Ok(Url::parse(endpoint)?)
    } else {
        Ok(Url::parse(&format!("https://{endpoint}"))?)
    }
}

/// On-disk form of the configuration.  Every field is optional; missing
/// fields keep their defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Endpoint URL or bare host.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// System instruction text, or a relative path to a `system.md` file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    /// Greeting text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub greeting: Option<String>,

    /// Retries after the first attempt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<u32>,

    /// Wait before the first retry, in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_delay_ms: Option<u64>,

    /// Ceiling for any single wait, in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_delay_ms: Option<u64>,

    /// Per-attempt timeout, in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl ConfigFile {
    /// Read a configuration file.
    ///
    /// A `system` value that is a relative path whose file name is
    /// `system.md` is replaced by the contents of that file, resolved
    /// relative to the configuration file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|err| Error::io(format!("failed to read {}", path.display()), err))?;
        let mut file: Self = serde_yaml::from_str(&content)?;

        if let Some(ref system) = file.system {
            let system_path = Path::new(system);
            if system_path.file_name().and_then(|n| n.to_str()) == Some("system.md")
                && !system_path.is_absolute()
            {
                let base = path.parent().unwrap_or_else(|| Path::new("."));
                let resolved = base.join(system_path);
                let text = std::fs::read_to_string(&resolved).map_err(|err| {
                    Error::io(format!("failed to read {}", resolved.display()), err)
                })?;
                file.system = Some(text);
            }
        }
        Ok(file)
    }

    /// Overlay this file onto `config`.
    pub fn apply(self, mut config: AssistantConfig) -> Result<AssistantConfig> {
        if let Some(endpoint) = self.endpoint {
            config.endpoint = parse_endpoint(&endpoint)?;
        }
        if let Some(system) = self.system {
            config.system_instruction = system;
        }
        if let Some(greeting) = self.greeting {
            config.greeting = greeting;
        }
        if let Some(max_retries) = self.max_retries {
            config.retry.max_retries = max_retries;
        }
        if let Some(ms) = self.initial_delay_ms {
            config.retry.initial_delay = Duration::from_millis(ms);
        }
        if let Some(ms) = self.max_delay_ms {
            config.retry.max_delay = Duration::from_millis(ms);
        }
        if let Some(secs) = self.timeout_secs {
            config.timeout = Duration::from_secs(secs);
        }
        config.validate()?;
        Ok(config)
    }
}
