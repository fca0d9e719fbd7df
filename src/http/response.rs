//! # Construcción de Respuestas HTTP
//! src/http/response.rs
//!
//! Este módulo genera las respuestas HTTP/1.1 del servidor. El conjunto
//! de headers es fijo y siempre en el mismo orden:
//!
//! ```text
//! HTTP/1.1 200 OK\r\n
//! Content-Type: text/html\r\n
//! Connection: close\r\n
//! Content-Length: 13\r\n
//! \r\n
//! <h1>Hola</h1>
//! ```
//!
//! `Connection: close` va en toda respuesta: el servidor atiende un
//! request por conexión y cierra el socket. `Content-Length` se emite
//! cuando el largo del cuerpo se conoce de antemano (archivos, páginas
//! ya renderizadas) y se omite cuando los bytes se van a escribir
//! conforme se produzcan.
//!
//! ## Ejemplo de uso
//!
//! ```
//! use capture_server::http::{Response, StatusCode};
//!
//! let response = Response::html(StatusCode::Ok, "<h1>Hola</h1>");
//! let bytes = response.to_bytes();
//! // Ahora puedes enviar `bytes` por el socket
//! ```

use super::StatusCode;

/// Genera los bytes del encabezado HTTP, hasta la línea en blanco
///
/// # Argumentos
///
/// * `status` - Código de estado de la respuesta
/// * `content_type` - Valor del header `Content-Type`
/// * `content_length` - Largo del cuerpo si se conoce; `None` lo omite
///
/// # Ejemplo
///
/// ```
/// use capture_server::http::StatusCode;
/// use capture_server::http::response::header_bytes;
///
/// let header = header_bytes(StatusCode::Ok, "text/plain", Some(4));
/// let text = String::from_utf8(header).unwrap();
/// assert_eq!(
///     text,
///     "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nConnection: close\r\nContent-Length: 4\r\n\r\n"
/// );
/// ```
pub fn header_bytes(
    status: StatusCode,
    content_type: &str,
    content_length: Option<u64>,
) -> Vec<u8> {
    let mut header = format!(
        "HTTP/1.1 {}\r\nContent-Type: {}\r\nConnection: close\r\n",
        status, content_type
    );
    if let Some(length) = content_length {
        header.push_str(&format!("Content-Length: {}\r\n", length));
    }
    header.push_str("\r\n");
    header.into_bytes()
}

/// Una respuesta completamente armada en memoria
///
/// Se usa para los cuerpos que ya están completos antes de escribir:
/// páginas renderizadas, errores 404. Los archivos estáticos no pasan
/// por aquí porque se escriben en chunks directamente al socket.
#[derive(Debug, Clone)]
pub struct Response {
    /// Código de estado HTTP (200 o 404)
    status: StatusCode,

    /// Valor del header Content-Type
    content_type: String,

    /// Cuerpo de la respuesta (puede ser binario)
    body: Vec<u8>,
}

impl Response {
    /// Crea una respuesta con estado, tipo de contenido y cuerpo
    pub fn new(status: StatusCode, content_type: &str, body: Vec<u8>) -> Self {
        Self {
            status,
            content_type: content_type.to_string(),
            body,
        }
    }

    /// Crea una respuesta `text/html` desde un string
    ///
    /// # Ejemplo
    ///
    /// ```
    /// use capture_server::http::{Response, StatusCode};
    ///
    /// let response = Response::html(StatusCode::Ok, "<h1>Hola</h1>");
    /// assert_eq!(response.status(), StatusCode::Ok);
    /// ```
    pub fn html(status: StatusCode, body: &str) -> Self {
        Self::new(status, "text/html", body.as_bytes().to_vec())
    }

    /// 404 para un archivo que no se pudo abrir
    ///
    /// El cuerpo incluye la ruta resuelta, para que el cliente vea
    /// exactamente qué se buscó en disco.
    ///
    /// # Ejemplo
    ///
    /// ```
    /// use capture_server::http::Response;
    ///
    /// let response = Response::not_found_file("./serving_files/nope.html");
    /// let body = String::from_utf8(response.body().to_vec()).unwrap();
    /// assert!(body.contains("./serving_files/nope.html"));
    /// ```
    pub fn not_found_file(path: &str) -> Self {
        let body = format!("File or command not found: {}", path);
        Self::new(StatusCode::NotFound, "text/plain", body.into_bytes())
    }

    /// 404 para un comando que no está en la lista blanca
    ///
    /// El cuerpo es una página HTML mínima que nombra el ejecutable
    /// pedido y ofrece un enlace de regreso.
    pub fn not_found_command(command: &str) -> Self {
        let mut body = String::from("<html><body><h1>404 - Executable Not Found</h1>");
        body.push_str(&format!(
            "<p>The requested executable '{}' was not found.</p>",
            command
        ));
        body.push_str("<a href='/'>Back to home</a></body></html>");
        Self::html(StatusCode::NotFound, &body)
    }

    /// 404 genérico para requests que no se pudieron clasificar
    pub fn not_found() -> Self {
        Self::new(
            StatusCode::NotFound,
            "text/plain",
            b"File or command not found".to_vec(),
        )
    }

    /// Convierte la respuesta a bytes listos para enviar por el socket
    ///
    /// El cuerpo está completo en memoria, así que `Content-Length`
    /// siempre va presente.
    ///
    /// # Ejemplo
    ///
    /// ```
    /// use capture_server::http::{Response, StatusCode};
    ///
    /// let bytes = Response::html(StatusCode::Ok, "Hola").to_bytes();
    /// let text = String::from_utf8(bytes).unwrap();
    /// assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
    /// assert!(text.ends_with("\r\n\r\nHola"));
    /// ```
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut result = header_bytes(
            self.status,
            &self.content_type,
            Some(self.body.len() as u64),
        );
        result.extend_from_slice(&self.body);
        result
    }

    /// Obtiene el código de estado de la respuesta
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Obtiene el Content-Type de la respuesta
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Obtiene una referencia al cuerpo
    pub fn body(&self) -> &[u8] {
        &self.body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_bytes_with_length() {
        let header = header_bytes(StatusCode::Ok, "text/html", Some(42));
        let text = String::from_utf8(header).unwrap();

        assert_eq!(
            text,
            "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nConnection: close\r\nContent-Length: 42\r\n\r\n"
        );
    }

    #[test]
    fn test_header_bytes_without_length() {
        let header = header_bytes(StatusCode::Ok, "text/html", None);
        let text = String::from_utf8(header).unwrap();

        assert!(!text.contains("Content-Length"));
        assert!(text.ends_with("Connection: close\r\n\r\n"));
    }

    #[test]
    fn test_header_order_is_fixed() {
        let header = header_bytes(StatusCode::NotFound, "text/plain", Some(5));
        let text = String::from_utf8(header).unwrap();

        let ct = text.find("Content-Type").unwrap();
        let conn = text.find("Connection").unwrap();
        let cl = text.find("Content-Length").unwrap();
        assert!(ct < conn && conn < cl);
    }

    #[test]
    fn test_to_bytes_complete_response() {
        let response = Response::html(StatusCode::Ok, "Test");
        let bytes = response.to_bytes();
        let text = String::from_utf8(bytes).unwrap();

        assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(text.contains("Content-Type: text/html\r\n"));
        assert!(text.contains("Connection: close\r\n"));
        assert!(text.contains("Content-Length: 4\r\n"));
        assert!(text.ends_with("\r\n\r\nTest"));
    }

    #[test]
    fn test_not_found_file_names_path() {
        let response = Response::not_found_file("./serving_files/missing.css");

        assert_eq!(response.status(), StatusCode::NotFound);
        assert_eq!(response.content_type(), "text/plain");

        let body = String::from_utf8(response.body().to_vec()).unwrap();
        assert!(body.contains("File or command not found"));
        assert!(body.contains("./serving_files/missing.css"));
    }

    #[test]
    fn test_not_found_command_names_executable() {
        let response = Response::not_found_command("hackme");

        assert_eq!(response.status(), StatusCode::NotFound);
        assert_eq!(response.content_type(), "text/html");

        let body = String::from_utf8(response.body().to_vec()).unwrap();
        assert!(body.contains("<h1>404 - Executable Not Found</h1>"));
        assert!(body.contains("The requested executable 'hackme' was not found."));
        assert!(body.contains("<a href='/'>Back to home</a>"));
    }

    #[test]
    fn test_generic_not_found() {
        let response = Response::not_found();

        assert_eq!(response.status(), StatusCode::NotFound);
        assert_eq!(response.body(), b"File or command not found");
    }

    #[test]
    fn test_binary_body_length() {
        let data = vec![0x00, 0x01, 0x02, 0xFF];
        let response = Response::new(StatusCode::Ok, "application/wasm", data.clone());
        let bytes = response.to_bytes();

        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("Content-Length: 4\r\n"));
        assert!(bytes.ends_with(&data));
    }
}
