//! # Comandos y Renderizado
//! src/commands/mod.rs
//!
//! Este módulo implementa las dos operaciones que lanzan procesos:
//!
//! - **execute**: corre un programa de la lista blanca con argumentos
//!   del usuario y envuelve su salida en la página de inicio
//! - **render_page**: invoca al intérprete sobre un script de página y
//!   retorna su salida como cuerpo HTTP
//!
//! ## Lista blanca
//!
//! Los ejecutables permitidos son exactamente los archivos regulares
//! directos del directorio configurado. El escaneo es fresco en cada
//! request: soltar un binario nuevo en el directorio lo habilita sin
//! reiniciar el servidor. El nombre pedido debe coincidir exacto con
//! una entrada; sin coincidencia no se lanza ningún proceso.

pub mod spawn;

// Re-exportar la primitiva de ejecución
pub use spawn::spawn_and_capture;

use std::fs;

use log::{error, trace};

use crate::config::Config;
use crate::router::LANDING_PAGE;
use crate::stats::StatsCollector;

/// Lista los nombres de los ejecutables permitidos
///
/// Solo cuentan archivos regulares directos del directorio; subdirectorios
/// y cualquier otra cosa se ignoran. Si el directorio no se puede leer,
/// la lista es vacía (ningún comando pasa).
pub fn scan_whitelist(dir: &str) -> Vec<String> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            error!("💥 No se pudo leer el directorio de ejecutables '{}': {}", dir, e);
            return Vec::new();
        }
    };

    let mut names = Vec::new();
    for entry in entries.flatten() {
        if entry.path().is_file() {
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
    }
    names
}

/// Ejecuta un comando de la lista blanca y envuelve su salida
///
/// El programa corre con los argumentos del usuario separados por
/// espacios. Su salida capturada se pasa, como un único argumento y
/// sin recortar, a un segundo renderizado de la página de inicio; el
/// HTML resultante es la respuesta.
///
/// # Argumentos
///
/// * `config` - Configuración (directorios e intérprete)
/// * `stats` - Collector donde se cuentan los procesos lanzados
/// * `command` - Nombre pedido, debe estar en la lista blanca
/// * `arguments` - Argumentos del usuario, separados por espacios
///
/// # Retorna
///
/// * `Some(body)` - HTML renderizado con la salida del comando
/// * `None` - El comando no está en la lista blanca; nada se ejecutó
pub fn execute(
    config: &Config,
    stats: &StatsCollector,
    command: &str,
    arguments: &str,
) -> Option<Vec<u8>> {
    let whitelist = scan_whitelist(&config.exec_dir);

    if !whitelist.iter().any(|name| name == command) {
        trace!("⚙️ Comando '{}' no está en la lista blanca", command);
        return None;
    }

    let program = format!("{}/{}", config.exec_dir, command);
    let args: Vec<&str> = arguments.split_whitespace().collect();

    stats.record_subprocess();
    let output = spawn_and_capture(&program, &args);

    // La salida capturada viaja como un único argumento al renderizado
    let captured = String::from_utf8_lossy(&output);
    let landing = format!("{}/{}", config.content_root, LANDING_PAGE);
    Some(render_page(config, stats, &landing, &[&captured]))
}

/// Renderiza un script de página con el intérprete configurado
///
/// El argv es `[script, args...]`: cada entrada de `args` llega al
/// script como un argumento separado. La salida del intérprete se
/// retorna completa, lista para usarse como cuerpo de la respuesta.
pub fn render_page(
    config: &Config,
    stats: &StatsCollector,
    script: &str,
    args: &[&str],
) -> Vec<u8> {
    let mut argv = Vec::with_capacity(args.len() + 1);
    argv.push(script);
    argv.extend_from_slice(args);

    stats.record_subprocess();
    spawn_and_capture(&config.interpreter, &argv)
}
