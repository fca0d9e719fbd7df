//! # Servidor TCP Concurrente
//! src/server/tcp.rs
//!
//! Acepta conexiones en un único thread (el acceptor) y las encola para
//! el pool de workers. El acceptor es el único punto donde se asignan
//! los identificadores de request, de forma secuencial desde 1.
//!
//! El listener opera en modo no bloqueante y el loop de accept revisa
//! la bandera de apagado entre intentos; así una señal detiene el
//! servidor sin depender de interrumpir un accept bloqueado. Las
//! conexiones aceptadas vuelven a modo bloqueante antes de encolarse,
//! porque los workers leen y escriben bloqueando.

use std::io;
use std::net::{SocketAddr, TcpListener};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use log::{error, info, trace};
use socket2::{Domain, Protocol, Socket, Type};

use crate::config::Config;
use crate::router::Router;
use crate::server::pool::{PendingConnection, WorkerPool};
use crate::stats::StatsCollector;

/// Pausa entre intentos de accept cuando no hay conexiones pendientes
const ACCEPT_POLL: Duration = Duration::from_millis(50);

/// Servidor HTTP con pool de workers y apagado por señal
#[derive(Debug)]
pub struct Server {
    config: Arc<Config>,
    router: Arc<Router>,
    stats: StatsCollector,
    stop: Arc<AtomicBool>,
    listener: TcpListener,
}

impl Server {
    /// Crea el socket de escucha con el backlog configurado
    ///
    /// `TcpListener::bind` de la librería estándar no permite elegir el
    /// backlog, así que el socket se arma a mano y recién después se
    /// convierte en listener.
    pub fn bind(config: Config) -> io::Result<Self> {
        let addr: SocketAddr = config.address().parse().map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("Dirección inválida '{}': {}", config.address(), e),
            )
        })?;

        let socket = Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))?;
        socket.set_reuse_address(true)?;
        socket.bind(&addr.into())?;
        socket.listen(config.backlog)?;

        let listener: TcpListener = socket.into();
        listener.set_nonblocking(true)?;

        let router = Arc::new(Router::new(&config.content_root));

        Ok(Self {
            config: Arc::new(config),
            router,
            stats: StatsCollector::new(),
            stop: Arc::new(AtomicBool::new(false)),
            listener,
        })
    }

    /// Dirección real de escucha (útil con puerto 0)
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Bandera compartida que detiene el loop de accept
    ///
    /// Los handlers de señal escriben `true` aquí.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    /// Colector de estadísticas del servidor
    pub fn stats(&self) -> StatsCollector {
        self.stats.clone()
    }

    /// Loop principal: aceptar, numerar y encolar hasta el apagado
    ///
    /// Al salir del loop ya no se aceptan conexiones nuevas, pero las
    /// encoladas se drenan y las que están en vuelo terminan completas.
    pub fn run(&mut self) -> io::Result<()> {
        let addr = self.listener.local_addr()?;
        info!(
            "🌐 Servidor escuchando en {} ({} workers, backlog {})",
            addr, self.config.workers, self.config.backlog
        );

        let pool = WorkerPool::start(
            self.config.workers,
            Arc::clone(&self.config),
            Arc::clone(&self.router),
            self.stats.clone(),
        );

        let mut next_request_id: u64 = 1;

        while !self.stop.load(Ordering::SeqCst) {
            match self.listener.accept() {
                Ok((stream, peer)) => {
                    // Los workers atienden en modo bloqueante
                    if let Err(e) = stream.set_nonblocking(false) {
                        error!("❌ Conexión de {} descartada: {}", peer, e);
                        continue;
                    }

                    trace!("✅ Conexión aceptada de {} (req {})", peer, next_request_id);
                    pool.enqueue(PendingConnection {
                        id: next_request_id,
                        stream,
                    });
                    next_request_id += 1;
                }
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                    thread::sleep(ACCEPT_POLL);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    error!("❌ Error al aceptar conexión: {}", e);
                }
            }
        }

        info!(
            "🛑 Apagado solicitado: {} conexiones en cola por drenar",
            pool.queue_len()
        );
        pool.stop();
        info!("📊 Resumen final: {}", self.stats.summary_json());

        Ok(())
    }
}
