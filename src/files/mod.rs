//! # Entrega de Archivos Estáticos
//! src/files/mod.rs
//!
//! Este módulo sirve archivos del disco directamente al socket. El
//! archivo se abre en binario, se anuncia su tamaño en `Content-Length`
//! y el contenido se copia en chunks de tamaño fijo hasta EOF.
//!
//! Si el archivo no se puede abrir, la respuesta es un 404 con la ruta
//! resuelta en el cuerpo. Un error de lectura a mitad de la copia
//! aborta la conexión sin cuerpo de error: el cliente ve una respuesta
//! truncada frente al `Content-Length` anunciado.

use std::fs::File;
use std::io::{self, Read, Write};
use std::net::TcpStream;

use crate::http::response::header_bytes;
use crate::http::{Response, StatusCode};

/// Resuelve el Content-Type según la extensión del archivo
///
/// Tabla fija; cualquier extensión desconocida es `text/plain`.
///
/// # Ejemplo
///
/// ```
/// use capture_server::files::content_type_for;
///
/// assert_eq!(content_type_for("./serving_files/style/main.css"), "text/css");
/// assert_eq!(content_type_for("./serving_files/notas"), "text/plain");
/// ```
pub fn content_type_for(path: &str) -> &'static str {
    let extension = path.rsplit_once('.').map(|(_, ext)| ext).unwrap_or("");
    match extension {
        "html" => "text/html",
        "css" => "text/css",
        "js" => "application/javascript",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "wasm" => "application/wasm",
        _ => "text/plain",
    }
}

/// Sirve un archivo por el socket, en chunks de tamaño fijo
///
/// # Argumentos
///
/// * `stream` - Socket del cliente
/// * `chunk` - Buffer de copia reutilizado del contexto de conexión
/// * `path` - Ruta ya resuelta bajo el directorio de contenido
/// * `raw` - Fuerza `text/plain` para ver el fuente sin ejecutarlo
///
/// # Retorna
///
/// * `Ok((status, bytes))` - Respuesta enviada completa, con los bytes
///   de cuerpo escritos
/// * `Err(e)` - Falla de I/O a mitad de camino; la conexión se aborta
pub fn serve(
    stream: &mut TcpStream,
    chunk: &mut [u8],
    path: &str,
    raw: bool,
) -> io::Result<(StatusCode, u64)> {
    let mut file = match File::open(path) {
        Ok(file) => file,
        Err(_) => {
            let response = Response::not_found_file(path);
            let body_len = response.body().len() as u64;
            stream.write_all(&response.to_bytes())?;
            return Ok((StatusCode::NotFound, body_len));
        }
    };

    let content_type = if raw { "text/plain" } else { content_type_for(path) };
    let size = file.metadata()?.len();

    stream.write_all(&header_bytes(StatusCode::Ok, content_type, Some(size)))?;

    let mut sent: u64 = 0;
    loop {
        let n = file.read(chunk)?;
        if n == 0 {
            break;
        }
        stream.write_all(&chunk[..n])?;
        sent += n as u64;
    }

    Ok((StatusCode::Ok, sent))
}
