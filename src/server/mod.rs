//! # Módulo del Servidor HTTP
//! src/server/mod.rs
//!
//! Este módulo implementa el servidor concurrente completo:
//! 1. `tcp`: el acceptor, que escucha, numera y encola conexiones
//! 2. `pool`: la cola FIFO protegida y el pool fijo de workers
//! 3. `connection`: el ciclo de vida de cada conexión dentro de un worker
//!
//! Cada conexión aceptada pasa por la cola y la atiende exactamente un
//! worker, que la procesa completa antes de tomar la siguiente.

pub mod connection;
pub mod pool;
pub mod tcp;

// Re-exportar para facilitar el uso
pub use connection::{ConnectionContext, BUFFER_SIZE};
pub use pool::{PendingConnection, TaskQueue, WorkerPool};
pub use tcp::Server;
