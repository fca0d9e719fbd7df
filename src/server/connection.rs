//! # Ciclo de Vida de una Conexión
//! src/server/connection.rs
//!
//! Cada worker es dueño de un único `ConnectionContext` que reutiliza
//! para todas las conexiones que atiende: los buffers se asignan una
//! sola vez al arrancar el worker, nunca por conexión.
//!
//! ## Estados
//!
//! ```text
//! Idle → Reading → Parsing → Dispatching → Responding → Closed
//! ```
//!
//! El avance es estrictamente lineal y el cierre del socket ocurre en
//! todo camino de salida, también en los de falla. Un error de I/O en
//! cualquier punto aborta la conexión sin respuesta; una falla de
//! parseo o una clasificación de error responden un 404 y cierran
//! normal.

use std::io::{self, Read, Write};
use std::net::TcpStream;
use std::sync::Arc;
use std::time::Instant;

use log::Level;

use crate::commands;
use crate::config::Config;
use crate::files;
use crate::http::{RequestInfo, RequestKind, Response, StatusCode};
use crate::logging;
use crate::router::Router;
use crate::server::pool::PendingConnection;
use crate::stats::StatsCollector;

/// Tamaño de los buffers de lectura y de copia, en bytes
pub const BUFFER_SIZE: usize = 4096;

/// Contexto reutilizable con el que un worker procesa conexiones
pub struct ConnectionContext {
    /// Índice del worker dueño, para los tags de log
    worker_index: usize,

    config: Arc<Config>,
    router: Arc<Router>,
    stats: StatsCollector,

    /// Socket de la conexión en curso; `None` entre conexiones
    socket: Option<TcpStream>,

    /// Chunk fijo donde caen los bytes de cada read()
    request_buffer: [u8; BUFFER_SIZE],

    /// Texto acumulado del request, hasta la línea en blanco
    request_text: String,

    /// Chunk fijo para copiar archivos al socket
    response_buffer: [u8; BUFFER_SIZE],

    /// Identificador del request en curso, asignado por el acceptor
    request_id: u64,

    /// Con esto en true el request no loguea nada, en ningún nivel
    suppress_logging: bool,

    /// Petición parseada y clasificada
    info: RequestInfo,
}

impl ConnectionContext {
    /// Crea el contexto de un worker; los buffers se asignan aquí
    pub fn new(
        worker_index: usize,
        config: Arc<Config>,
        router: Arc<Router>,
        stats: StatsCollector,
    ) -> Self {
        Self {
            worker_index,
            config,
            router,
            stats,
            socket: None,
            request_buffer: [0u8; BUFFER_SIZE],
            request_text: String::with_capacity(BUFFER_SIZE),
            response_buffer: [0u8; BUFFER_SIZE],
            request_id: 0,
            suppress_logging: false,
            info: RequestInfo::default(),
        }
    }

    /// Toma posesión de una conexión desencolada
    pub fn assign(&mut self, conn: PendingConnection) {
        self.request_id = conn.id;
        self.socket = Some(conn.stream);
    }

    /// Procesa la conexión asignada de principio a fin
    ///
    /// Pase lo que pase, al salir el socket queda cerrado y el contexto
    /// limpio para la siguiente conexión.
    pub fn run(&mut self) {
        if let Err(e) = self.process() {
            self.stats.record_aborted();
            self.log(Level::Error, &format!("💥 Conexión abortada: {}", e));
        }
        self.cleanup();
    }

    /// Reading → Parsing → Dispatching → Responding
    fn process(&mut self) -> io::Result<()> {
        self.read_request()?;

        // Una falla de parseo deja el kind por defecto (Error) y el
        // despacho responde el 404 genérico
        match self.router.route(&self.request_text) {
            Ok(info) => self.info = info,
            Err(e) => {
                self.log(Level::Trace, &format!("Request no parseable: {}", e));
            }
        }

        self.suppress_logging =
            logging::is_quiet(&self.info.target, &self.config.quiet_prefix);
        self.log(Level::Trace, &self.info.summary());

        let label = self.info.kind.label();
        let start = Instant::now();
        let kind = self.info.kind.clone();

        let result = match kind {
            RequestKind::File { path, raw } => self.handle_file(&path, raw),
            RequestKind::Page { path, args } => {
                if args.is_empty() {
                    self.handle_page(&path, &[])
                } else {
                    self.handle_page(&path, &[args.as_str()])
                }
            }
            RequestKind::Directory { page, args } => {
                // Cada parámetro k=v llega al script como argv separado
                let parts: Vec<&str> = args.split_whitespace().collect();
                self.handle_page(&page, &parts)
            }
            RequestKind::Command { command, arguments } => {
                self.handle_command(&command, &arguments)
            }
            RequestKind::Error => self.handle_error(),
        };

        let (status, bytes) = result?;
        let elapsed_ms = start.elapsed().as_millis();

        self.stats.record_request(label, status, bytes);
        self.log(
            Level::Info,
            &format!(
                "{} {} {} ({} bytes, {} ms)",
                self.info.method, self.info.target, status, bytes, elapsed_ms
            ),
        );

        Ok(())
    }

    /// Lee del socket hasta ver la línea en blanco o EOF
    fn read_request(&mut self) -> io::Result<()> {
        let socket = match self.socket.as_mut() {
            Some(socket) => socket,
            None => return Ok(()),
        };

        loop {
            let n = socket.read(&mut self.request_buffer)?;
            if n == 0 {
                break;
            }

            self.request_text
                .push_str(&String::from_utf8_lossy(&self.request_buffer[..n]));

            // Fin de los headers: no interesa nada después
            if self.request_text.contains("\r\n\r\n") {
                break;
            }
        }

        Ok(())
    }

    /// Sirve un archivo estático en chunks
    fn handle_file(&mut self, path: &str, raw: bool) -> io::Result<(StatusCode, u64)> {
        let socket = match self.socket.as_mut() {
            Some(socket) => socket,
            None => return Err(io::Error::new(io::ErrorKind::NotConnected, "sin socket")),
        };
        files::serve(socket, &mut self.response_buffer, path, raw)
    }

    /// Renderiza un script de página y responde su salida como HTML
    fn handle_page(&mut self, script: &str, args: &[&str]) -> io::Result<(StatusCode, u64)> {
        let body = commands::render_page(&self.config, &self.stats, script, args);
        self.send_response(Response::new(StatusCode::Ok, "text/html", body))
    }

    /// Ejecuta un comando de la lista blanca y envuelve su salida
    fn handle_command(
        &mut self,
        command: &str,
        arguments: &str,
    ) -> io::Result<(StatusCode, u64)> {
        match commands::execute(&self.config, &self.stats, command, arguments) {
            Some(body) => self.send_response(Response::new(StatusCode::Ok, "text/html", body)),
            None => self.send_response(Response::not_found_command(command)),
        }
    }

    /// 404 genérico para requests no clasificables
    fn handle_error(&mut self) -> io::Result<(StatusCode, u64)> {
        self.send_response(Response::not_found())
    }

    /// Escribe una respuesta ya armada, completa
    fn send_response(&mut self, response: Response) -> io::Result<(StatusCode, u64)> {
        let socket = match self.socket.as_mut() {
            Some(socket) => socket,
            None => return Err(io::Error::new(io::ErrorKind::NotConnected, "sin socket")),
        };

        socket.write_all(&response.to_bytes())?;
        Ok((response.status(), response.body().len() as u64))
    }

    /// Log tageado con el request y el worker, salvo supresión
    fn log(&self, level: Level, message: &str) {
        if self.suppress_logging {
            return;
        }
        log::log!(
            level,
            "[req {}] [worker {}] {}",
            self.request_id,
            self.worker_index,
            message
        );
    }

    /// Cierra el socket y deja el contexto listo para la siguiente
    fn cleanup(&mut self) {
        if let Some(socket) = self.socket.take() {
            drop(socket);
        }
        self.request_buffer.fill(0);
        self.response_buffer.fill(0);
        self.request_text.clear();
        self.info.reset();
        self.suppress_logging = false;
    }
}
