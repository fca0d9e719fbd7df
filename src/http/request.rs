//! # Parsing de la Request Line
//! src/http/request.rs
//!
//! Este módulo parsea la primera línea de un request HTTP/1.1 y define
//! los tipos que describen una petición ya clasificada.
//!
//! ## Formato de un request
//!
//! ```text
//! GET /ruta?file=programa&arguments=a+b HTTP/1.1\r\n
//! Host: localhost:8080\r\n
//! \r\n
//! ```
//!
//! Solo la request line se interpreta; los headers se leen únicamente
//! para detectar la línea en blanco que los termina. El método y la
//! versión se conservan textuales, sin validar contra una lista: el
//! servidor responde igual a cualquier método.

use std::fmt;

/// Clasificación de una petición según su target.
///
/// La variante determina por completo qué rama de despacho se ejecuta,
/// y cada variante lleva exactamente los datos que esa rama necesita.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestKind {
    /// Servir un archivo bajo el directorio de contenido.
    /// `raw` fuerza `text/plain` para ver scripts sin ejecutarlos.
    File { path: String, raw: bool },

    /// Renderizar una página de navegación de directorios o de código.
    /// `args` lleva los parámetros como pares `k=v` separados por
    /// espacio; el despacho los reparte en argumentos individuales.
    Directory { page: String, args: String },

    /// Ejecutar un programa de la lista blanca con argumentos del usuario.
    Command { command: String, arguments: String },

    /// Renderizar una página dinámica invocando al intérprete.
    /// `args` es la query string cruda (puede estar vacía).
    Page { path: String, args: String },

    /// Petición no clasificable: se responde con un 404 genérico.
    Error,
}

impl RequestKind {
    /// Etiqueta corta de la variante, para logs y estadísticas
    pub fn label(&self) -> &'static str {
        match self {
            RequestKind::File { .. } => "file",
            RequestKind::Directory { .. } => "directory",
            RequestKind::Command { .. } => "command",
            RequestKind::Page { .. } => "page",
            RequestKind::Error => "error",
        }
    }
}

impl Default for RequestKind {
    /// Estado previo al ruteo: si nadie clasifica, se responde error
    fn default() -> Self {
        RequestKind::Error
    }
}

/// Datos de una petición ya parseada y clasificada.
///
/// Cada instancia pertenece al contexto de conexión que la procesa y se
/// reinicia a sus valores por defecto cuando el worker reutiliza el
/// contexto para la siguiente conexión.
#[derive(Debug, Clone, Default)]
pub struct RequestInfo {
    /// Método HTTP textual (GET, POST, lo que haya llegado)
    pub method: String,

    /// Versión HTTP textual (HTTP/1.1, HTTP/1.0, ...)
    pub version: String,

    /// Texto crudo del request hasta la línea en blanco inclusive
    pub raw_path: String,

    /// Target ya normalizado (sin "../" ni slash inicial), previo a
    /// la clasificación; se usa para la supresión de logging
    pub target: String,

    /// Clasificación de la petición; se asigna una sola vez al rutear
    pub kind: RequestKind,
}

impl RequestInfo {
    /// Vuelve al estado por defecto para reutilizar la instancia
    pub fn reset(&mut self) {
        self.method.clear();
        self.version.clear();
        self.raw_path.clear();
        self.target.clear();
        self.kind = RequestKind::Error;
    }

    /// Resumen de una línea para el log de trazas
    pub fn summary(&self) -> String {
        let operative = match &self.kind {
            RequestKind::File { path, raw } => {
                if *raw {
                    format!("{} (raw)", path)
                } else {
                    path.clone()
                }
            }
            RequestKind::Directory { page, args } => format!("{} [{}]", page, args),
            RequestKind::Command { command, arguments } => {
                format!("{} [{}]", command, arguments)
            }
            RequestKind::Page { path, args } => {
                if args.is_empty() {
                    path.clone()
                } else {
                    format!("{} [{}]", path, args)
                }
            }
            RequestKind::Error => "-".to_string(),
        };
        format!(
            "{} {} {} clasificado como {}: {}",
            self.method,
            self.target,
            self.version,
            self.kind.label(),
            operative
        )
    }
}

/// Request line ya separada en sus tres tokens
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    pub method: String,
    pub target: String,
    pub version: String,
}

/// Errores que pueden ocurrir durante el parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Request vacío (el peer cerró sin enviar nada útil)
    EmptyRequest,

    /// La request line no tiene el formato `METHOD TARGET VERSION`
    InvalidRequestLine,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::EmptyRequest => write!(f, "Empty request"),
            ParseError::InvalidRequestLine => write!(f, "Invalid request line format"),
        }
    }
}

impl std::error::Error for ParseError {}

/// Parsea la request line (primera línea del texto recibido)
///
/// # Argumentos
///
/// * `raw` - Texto acumulado del request, hasta la línea en blanco
///
/// # Retorna
///
/// * `Ok(RequestLine)` - Los tres tokens de la primera línea
/// * `Err(ParseError)` - Request vacío o línea malformada
///
/// # Ejemplo
///
/// ```
/// use capture_server::http::request::parse_request_line;
///
/// let line = parse_request_line("GET /index.html HTTP/1.1\r\n\r\n").unwrap();
/// assert_eq!(line.method, "GET");
/// assert_eq!(line.target, "/index.html");
/// assert_eq!(line.version, "HTTP/1.1");
/// ```
pub fn parse_request_line(raw: &str) -> Result<RequestLine, ParseError> {
    if raw.trim().is_empty() {
        return Err(ParseError::EmptyRequest);
    }

    let first_line = raw.split("\r\n").next().unwrap_or("");
    let parts: Vec<&str> = first_line.split_whitespace().collect();

    // Debe tener exactamente 3 partes: METHOD TARGET VERSION
    if parts.len() != 3 {
        return Err(ParseError::InvalidRequestLine);
    }

    Ok(RequestLine {
        method: parts[0].to_string(),
        target: parts[1].to_string(),
        version: parts[2].to_string(),
    })
}
