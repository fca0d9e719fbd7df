//! # Capture Server
//! src/lib.rs
//!
//! Servidor HTTP concurrente para el curso de Principios de Sistemas
//! Operativos: pool fijo de threads, cola de conexiones sincronizada y
//! captura de la salida de procesos hijos para servirla por HTTP.
//!
//! ## Arquitectura
//!
//! El servidor está dividido en módulos especializados:
//! - `http`: Parseo de la request line y formato de respuestas HTTP/1.1
//! - `router`: Normalización del path y clasificación de cada petición
//! - `server`: Acceptor TCP, cola de conexiones y pool de workers
//! - `commands`: Lista blanca de ejecutables y captura de su salida
//! - `files`: Servido de archivos estáticos en chunks
//! - `stats`: Contadores agregados del servidor
//! - `config`: Parámetros de línea de comandos y variables de entorno
//! - `logging`: Inicialización del logger y supresión por prefijo
//!
//! ## Ejemplo de uso
//!
//! ```no_run
//! use capture_server::config::Config;
//! use capture_server::server::Server;
//!
//! let config = Config::default();
//! let mut server = Server::bind(config).expect("Error al crear el socket");
//! server.run().expect("Error del servidor");
//! ```

pub mod commands;
pub mod config;
pub mod files;
pub mod http;
pub mod logging;
pub mod router;
pub mod server;
pub mod stats;
