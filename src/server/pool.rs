//! # Pool de Workers y Cola de Conexiones
//! src/server/pool.rs
//!
//! Implementa la cola FIFO de conexiones aceptadas y el pool fijo de
//! workers que las atiende. La cola es un `VecDeque` protegido por un
//! mutex más una condvar; los workers bloquean en "hay conexiones o
//! estamos parando".
//!
//! ## Apagado
//!
//! La bandera de parada vive DENTRO del mutex de la cola: así no hay
//! ventana entre "revisar la bandera" y "dormirse en la condvar" en la
//! que se pueda perder el aviso. Al parar, los workers drenan lo que
//! quede encolado y recién entonces terminan.

use std::collections::VecDeque;
use std::net::TcpStream;
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};

use log::{error, trace};

use crate::config::Config;
use crate::router::Router;
use crate::server::connection::ConnectionContext;
use crate::stats::StatsCollector;

/// Una conexión aceptada esperando a que un worker la tome
pub struct PendingConnection {
    /// Identificador del request, asignado por el acceptor
    pub id: u64,

    /// Socket del cliente
    pub stream: TcpStream,
}

/// Estado interno de la cola, todo bajo el mismo mutex
struct QueueState {
    pending: VecDeque<PendingConnection>,
    stopping: bool,
}

/// Cola FIFO thread-safe de conexiones
pub struct TaskQueue {
    /// Estado protegido
    state: Arc<Mutex<QueueState>>,

    /// Condvar para despertar workers cuando llega trabajo
    condvar: Arc<Condvar>,
}

impl TaskQueue {
    /// Crea una cola vacía, sin límite de profundidad
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(QueueState {
                pending: VecDeque::new(),
                stopping: false,
            })),
            condvar: Arc::new(Condvar::new()),
        }
    }

    /// Encola una conexión y despierta a un worker
    pub fn enqueue(&self, conn: PendingConnection) {
        let mut state = self.state.lock().unwrap();
        state.pending.push_back(conn);
        self.condvar.notify_one();
    }

    /// Desencola la conexión más antigua
    ///
    /// Bloquea hasta que haya una conexión o la cola esté parando.
    /// Con la cola parando, primero se drena lo pendiente; `None`
    /// significa "vacía y parando": el worker debe terminar.
    pub fn dequeue(&self) -> Option<PendingConnection> {
        let mut state = self.state.lock().unwrap();

        loop {
            if let Some(conn) = state.pending.pop_front() {
                return Some(conn);
            }

            if state.stopping {
                return None;
            }

            // Esperar a que haya conexiones o llegue la orden de parar
            state = self.condvar.wait(state).unwrap();
        }
    }

    /// Marca la cola como parando y despierta a todos los workers
    pub fn shutdown(&self) {
        let mut state = self.state.lock().unwrap();
        state.stopping = true;
        self.condvar.notify_all();
    }

    /// Retorna el tamaño actual de la cola
    pub fn len(&self) -> usize {
        let state = self.state.lock().unwrap();
        state.pending.len()
    }

    /// Verifica si la cola está vacía
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for TaskQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for TaskQueue {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            condvar: Arc::clone(&self.condvar),
        }
    }
}

/// Pool fijo de workers atendiendo la cola de conexiones
pub struct WorkerPool {
    queue: TaskQueue,
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Lanza `count` workers, cada uno con su contexto de conexión
    pub fn start(
        count: usize,
        config: Arc<Config>,
        router: Arc<Router>,
        stats: StatsCollector,
    ) -> Self {
        let queue = TaskQueue::new();
        let mut handles = Vec::with_capacity(count);

        for index in 0..count {
            let worker_queue = queue.clone();
            let config = Arc::clone(&config);
            let router = Arc::clone(&router);
            let stats = stats.clone();

            handles.push(thread::spawn(move || {
                worker_loop(index, worker_queue, config, router, stats);
            }));
        }

        Self { queue, handles }
    }

    /// Encola una conexión aceptada
    pub fn enqueue(&self, conn: PendingConnection) {
        self.queue.enqueue(conn);
    }

    /// Retorna cuántas conexiones esperan worker
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Para la cola y espera a que cada worker termine su trabajo actual
    pub fn stop(self) {
        self.queue.shutdown();

        for handle in self.handles {
            if let Err(e) = handle.join() {
                error!("💥 Un worker terminó con pánico: {:?}", e);
            }
        }
    }
}

/// Ciclo de vida de un worker: un contexto, conexiones en serie
fn worker_loop(
    index: usize,
    queue: TaskQueue,
    config: Arc<Config>,
    router: Arc<Router>,
    stats: StatsCollector,
) {
    trace!("👷 [worker {}] iniciado", index);

    let mut ctx = ConnectionContext::new(index, config, router, stats);

    while let Some(conn) = queue.dequeue() {
        ctx.assign(conn);
        ctx.run();
    }

    trace!("👷 [worker {}] terminado", index);
}
