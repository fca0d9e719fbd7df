//! # Estadísticas del Servidor
//! src/stats/mod.rs
//!
//! Contadores agregados de lo que el servidor atendió: requests por
//! tipo, bytes enviados, procesos hijos lanzados. Los workers comparten
//! un único collector protegido por mutex y el resumen se emite como
//! una línea JSON al apagar el servidor.

use std::sync::{Arc, Mutex};
use std::time::Instant;

use serde::Serialize;

use crate::http::StatusCode;

/// Collector de estadísticas compartido entre workers
#[derive(Clone, Debug)]
pub struct StatsCollector {
    inner: Arc<Mutex<StatsData>>,
    start_time: Instant,
}

/// Contadores internos
#[derive(Debug)]
struct StatsData {
    /// Total de requests con respuesta enviada
    total_requests: u64,

    /// Requests por tipo de petición
    files: u64,
    pages: u64,
    directories: u64,
    commands: u64,
    errors: u64,

    /// Respuestas con estado 404
    responses_404: u64,

    /// Bytes de cuerpo escritos al socket
    bytes_sent: u64,

    /// Procesos hijos lanzados (comandos y renderizados)
    subprocesses: u64,

    /// Conexiones abortadas por error de I/O
    aborted: u64,
}

/// Foto de los contadores en un instante dado
#[derive(Debug, Clone, Serialize)]
pub struct StatsSnapshot {
    pub uptime_seconds: u64,
    pub total_requests: u64,
    pub files: u64,
    pub pages: u64,
    pub directories: u64,
    pub commands: u64,
    pub errors: u64,
    pub responses_404: u64,
    pub bytes_sent: u64,
    pub subprocesses: u64,
    pub aborted: u64,
}

impl StatsCollector {
    /// Crea un collector con todos los contadores en cero
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(StatsData {
                total_requests: 0,
                files: 0,
                pages: 0,
                directories: 0,
                commands: 0,
                errors: 0,
                responses_404: 0,
                bytes_sent: 0,
                subprocesses: 0,
                aborted: 0,
            })),
            start_time: Instant::now(),
        }
    }

    /// Registra un request con respuesta completa
    ///
    /// # Argumentos
    ///
    /// * `kind_label` - Etiqueta del tipo (`RequestKind::label()`)
    /// * `status` - Estado de la respuesta enviada
    /// * `bytes` - Bytes de cuerpo escritos
    pub fn record_request(&self, kind_label: &str, status: StatusCode, bytes: u64) {
        let mut data = self.inner.lock().unwrap();

        data.total_requests += 1;
        data.bytes_sent += bytes;

        match kind_label {
            "file" => data.files += 1,
            "page" => data.pages += 1,
            "directory" => data.directories += 1,
            "command" => data.commands += 1,
            _ => data.errors += 1,
        }

        if !status.is_success() {
            data.responses_404 += 1;
        }
    }

    /// Registra el lanzamiento de un proceso hijo
    pub fn record_subprocess(&self) {
        let mut data = self.inner.lock().unwrap();
        data.subprocesses += 1;
    }

    /// Registra una conexión abortada por error de I/O
    pub fn record_aborted(&self) {
        let mut data = self.inner.lock().unwrap();
        data.aborted += 1;
    }

    /// Obtiene una foto de los contadores actuales
    pub fn snapshot(&self) -> StatsSnapshot {
        let data = self.inner.lock().unwrap();

        StatsSnapshot {
            uptime_seconds: self.start_time.elapsed().as_secs(),
            total_requests: data.total_requests,
            files: data.files,
            pages: data.pages,
            directories: data.directories,
            commands: data.commands,
            errors: data.errors,
            responses_404: data.responses_404,
            bytes_sent: data.bytes_sent,
            subprocesses: data.subprocesses,
            aborted: data.aborted,
        }
    }

    /// Resumen de los contadores como una línea JSON
    pub fn summary_json(&self) -> String {
        serde_json::to_string(&self.snapshot()).unwrap_or_else(|_| String::from("{}"))
    }
}

impl Default for StatsCollector {
    fn default() -> Self {
        Self::new()
    }
}
