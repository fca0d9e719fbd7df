//! # Capture Server - Entry Point
//! src/main.rs
//!
//! Punto de entrada del servidor: parsea la configuración, inicializa
//! el logging, registra los handlers de señales y arranca el servidor.
//!
//! El proceso termina con código 1 ante configuración inválida o
//! errores fatales de arranque; el apagado por señal termina con 0.

use std::process;
use std::sync::Arc;

use signal_hook::consts::{SIGHUP, SIGINT, SIGQUIT, SIGTERM};

use capture_server::config::Config;
use capture_server::logging;
use capture_server::server::Server;

fn main() {
    println!("=================================");
    println!("  Capture HTTP Server");
    println!("  Principios de Sistemas Operativos");
    println!("=================================\n");

    // Configuración desde CLI y variables de entorno
    let config = Config::new();
    if let Err(e) = config.validate() {
        eprintln!("💥 Configuración inválida: {}", e);
        process::exit(1);
    }

    logging::init(&config);
    config.print_summary();

    let mut server = match Server::bind(config) {
        Ok(server) => server,
        Err(e) => {
            eprintln!("💥 No se pudo crear el socket de escucha: {}", e);
            process::exit(1);
        }
    };

    // Cualquiera de las cuatro señales de terminación baja el servidor
    // con gracia; SIGPIPE ya viene ignorada en procesos Rust, así que
    // un cliente que corta la conexión solo produce un error de write.
    let stop = server.stop_handle();
    for signal in [SIGINT, SIGTERM, SIGHUP, SIGQUIT] {
        if let Err(e) = signal_hook::flag::register(signal, Arc::clone(&stop)) {
            eprintln!("💥 No se pudo registrar el handler de la señal {}: {}", signal, e);
            process::exit(1);
        }
    }

    // Bloquea hasta el apagado
    if let Err(e) = server.run() {
        eprintln!("💥 Error fatal: {}", e);
        process::exit(1);
    }
}
