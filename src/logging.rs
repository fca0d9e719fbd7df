//! # Logging del Servidor
//! src/logging.rs
//!
//! El servidor loguea en tres severidades a través de la fachada `log`:
//!
//! - **trace**: detalle por conexión (accepts, clasificación, procesos)
//! - **info**: una línea por request completado
//! - **error**: fallas de I/O y de procesos hijos
//!
//! El backend es `env_logger` escribiendo a stderr. El nivel mínimo
//! sale de la configuración, y `RUST_LOG` puede sobreescribirlo como
//! con cualquier binario que use `env_logger`.
//!
//! Aparte del filtrado por nivel existe la supresión: los requests
//! cuyo target empieza con el prefijo silencioso no loguean nada, en
//! ningún nivel. Sirve para que los assets de estilo no inunden la
//! salida con una línea por stylesheet.

use env_logger::Env;

use crate::config::Config;

/// Inicializa el logger global según la configuración
///
/// Es inofensivo llamarla más de una vez: solo la primera gana.
pub fn init(config: &Config) {
    env_logger::Builder::from_env(Env::default().default_filter_or(config.log_filter()))
        .format_timestamp_millis()
        .try_init()
        .ok();
}

/// Determina si un request queda completamente fuera del log
///
/// # Argumentos
///
/// * `target` - Target normalizado del request (sin slash inicial)
/// * `prefix` - Prefijo silencioso configurado; vacío desactiva la supresión
///
/// # Ejemplo
///
/// ```
/// use capture_server::logging::is_quiet;
///
/// assert!(is_quiet("style/main.css", "style/"));
/// assert!(!is_quiet("index.php", "style/"));
/// assert!(!is_quiet("style/main.css", ""));
/// ```
pub fn is_quiet(target: &str, prefix: &str) -> bool {
    !prefix.is_empty() && target.starts_with(prefix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiet_prefix_matches() {
        assert!(is_quiet("style/main.css", "style/"));
        assert!(is_quiet("style/web/hack.css", "style/"));
    }

    #[test]
    fn test_other_targets_are_logged() {
        assert!(!is_quiet("index.php", "style/"));
        assert!(!is_quiet("classwork/style/x.css", "style/"));
        assert!(!is_quiet("", "style/"));
    }

    #[test]
    fn test_empty_prefix_disables_suppression() {
        assert!(!is_quiet("style/main.css", ""));
        assert!(!is_quiet("", ""));
    }

    #[test]
    fn test_init_twice_does_not_panic() {
        let config = Config::default();
        init(&config);
        init(&config);
    }
}
