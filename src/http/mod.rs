//! # Módulo HTTP
//!
//! Este módulo implementa la porción de HTTP/1.1 que el servidor usa,
//! sin librerías de alto nivel. Incluye:
//!
//! - Parsing de la request line
//! - Clasificación de peticiones (`RequestKind`)
//! - Construcción de responses con el set fijo de headers
//! - Los dos status codes que el servidor produce
//!
//! ## Alcance del protocolo
//!
//! Solo se interpreta la request line; los headers del cliente se leen
//! únicamente para encontrar la línea en blanco que marca el final.
//! Toda respuesta cierra la conexión (`Connection: close`): un request
//! por conexión, sin keep-alive ni pipelining.
//!
//! ### Formato de Request
//!
//! ```text
//! GET /path?query=value HTTP/1.1\r\n
//! Header-Name: Header-Value\r\n
//! \r\n
//! ```
//!
//! ### Formato de Response
//!
//! ```text
//! HTTP/1.1 200 OK\r\n
//! Content-Type: text/html\r\n
//! Connection: close\r\n
//! Content-Length: 13\r\n
//! \r\n
//! <h1>Hola</h1>
//! ```

pub mod request;   // Parsing y clasificación de requests
pub mod response;  // Construcción de responses
pub mod status;    // Códigos de estado HTTP

// Re-exportamos los tipos principales para facilitar su uso
// Esto permite usar `http::Response` en vez de `http::response::Response`
pub use request::{ParseError, RequestInfo, RequestKind};
pub use response::Response;
pub use status::StatusCode;
