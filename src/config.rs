//! # Configuración del Servidor
//! src/config.rs
//!
//! Este módulo define la configuración del servidor con soporte completo
//! para argumentos CLI y variables de entorno.
//!
//! ## Ejemplos de uso
//!
//! ### CLI
//! ```bash
//! ./capture_server --port 8080 \
//!   --workers 4 \
//!   --content-root ./serving_files \
//!   --exec-dir ./Executables
//! ```
//!
//! ### Variables de entorno
//! ```bash
//! CAPTURE_PORT=8080 CAPTURE_HOST=0.0.0.0 ./capture_server
//! ```

use std::path::Path;

use clap::Parser;

/// Niveles de log aceptados por `--log-level`
const LOG_LEVELS: [&str; 3] = ["trace", "info", "error"];

/// Configuración del servidor HTTP/1.1
#[derive(Debug, Clone, Parser)]
#[command(name = "capture_server")]
#[command(about = "Servidor HTTP concurrente con captura de procesos para Principios de Sistemas Operativos")]
#[command(version = "0.1.0")]
pub struct Config {
    /// Puerto en el que escucha el servidor
    #[arg(short, long, default_value = "8080", env = "CAPTURE_PORT")]
    pub port: u16,

    /// Host/IP en el que escucha
    #[arg(long, default_value = "0.0.0.0", env = "CAPTURE_HOST")]
    pub host: String,

    /// Backlog de conexiones pendientes en el listen()
    #[arg(long, default_value = "10", env = "CAPTURE_BACKLOG")]
    pub backlog: i32,

    // === Workers ===

    /// Número de workers que atienden conexiones
    #[arg(short, long, default_value = "4", env = "CAPTURE_WORKERS")]
    pub workers: usize,

    // === Contenido ===

    /// Directorio raíz del contenido servible (archivos y páginas)
    #[arg(long = "content-root", default_value = "./serving_files", env = "CAPTURE_CONTENT_ROOT")]
    pub content_root: String,

    /// Directorio cuyos archivos forman la lista blanca de ejecutables
    #[arg(long = "exec-dir", default_value = "./Executables", env = "CAPTURE_EXEC_DIR")]
    pub exec_dir: String,

    /// Intérprete con el que se renderizan las páginas
    #[arg(long, default_value = "php", env = "CAPTURE_INTERPRETER")]
    pub interpreter: String,

    // === Logging ===

    /// Nivel mínimo de log (trace, info, error)
    #[arg(long = "log-level", default_value = "info", env = "CAPTURE_LOG_LEVEL")]
    pub log_level: String,

    /// Prefijo de target cuyos requests no se loguean (vacío lo desactiva)
    #[arg(long = "quiet-prefix", default_value = "style/", env = "CAPTURE_QUIET_PREFIX")]
    pub quiet_prefix: String,

    /// Equivale a --log-level trace
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Crea una nueva configuración parseando argumentos CLI
    ///
    /// # Ejemplo
    /// ```no_run
    /// use capture_server::config::Config;
    ///
    /// let config = Config::new();
    /// println!("Server listening on {}", config.address());
    /// ```
    pub fn new() -> Self {
        Config::parse()
    }

    /// Obtiene la dirección completa para bind (host:port)
    ///
    /// # Ejemplo
    /// ```rust
    /// use capture_server::config::Config;
    ///
    /// let config = Config::default();
    /// assert_eq!(config.address(), "0.0.0.0:8080");
    /// ```
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Filtro de nivel efectivo para el logger
    ///
    /// `--verbose` manda sobre `--log-level`.
    pub fn log_filter(&self) -> &str {
        if self.verbose {
            "trace"
        } else {
            &self.log_level
        }
    }

    /// Valida la configuración
    ///
    /// Retorna errores si hay valores inválidos
    pub fn validate(&self) -> Result<(), String> {
        // Validar puerto
        if self.port == 0 {
            return Err("Port must be >= 1".to_string());
        }

        // Validar workers
        if self.workers == 0 {
            return Err("Workers must be >= 1".to_string());
        }

        // Validar backlog
        if self.backlog < 1 {
            return Err("Backlog must be >= 1".to_string());
        }

        // Validar directorios y programas
        if self.content_root.is_empty() {
            return Err("Content root must not be empty".to_string());
        }
        if !Path::new(&self.content_root).is_dir() {
            return Err(format!(
                "Content root '{}' is not a directory",
                self.content_root
            ));
        }
        if self.exec_dir.is_empty() {
            return Err("Executables directory must not be empty".to_string());
        }
        if self.interpreter.is_empty() {
            return Err("Interpreter must not be empty".to_string());
        }

        // Validar nivel de log
        if !LOG_LEVELS.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Log level must be one of: {}",
                LOG_LEVELS.join(", ")
            ));
        }

        Ok(())
    }

    /// Imprime un resumen de la configuración
    pub fn print_summary(&self) {
        println!("╔══════════════════════════════════════════════════════════════╗");
        println!("║            Capture Server HTTP/1.1 Configuration             ║");
        println!("╚══════════════════════════════════════════════════════════════╝");
        println!();
        println!("🌐 Network:");
        println!("   Address:      {}", self.address());
        println!("   Backlog:      {}", self.backlog);
        println!();
        println!("📁 Content:");
        println!("   Content root: {}", self.content_root);
        println!("   Executables:  {}", self.exec_dir);
        println!("   Interpreter:  {}", self.interpreter);
        println!();
        println!("👷 Workers:");
        println!("   Pool size:    {}", self.workers);
        println!();
        println!("📋 Logging:");
        println!("   Level:        {}", self.log_filter());

        if self.quiet_prefix.is_empty() {
            println!("   Quiet prefix: disabled");
        } else {
            println!("   Quiet prefix: {}", self.quiet_prefix);
        }

        println!();
        println!("═══════════════════════════════════════════════════════════════");
        println!();
    }
}

impl Default for Config {
    /// Configuración por defecto
    fn default() -> Self {
        Self {
            port: 8080,
            host: "0.0.0.0".to_string(),
            backlog: 10,
            workers: 4,
            content_root: "./serving_files".to_string(),
            exec_dir: "./Executables".to_string(),
            interpreter: "php".to_string(),
            log_level: "info".to_string(),
            quiet_prefix: "style/".to_string(),
            verbose: false,
        }
    }
}
