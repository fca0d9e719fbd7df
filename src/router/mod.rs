//! # Clasificación de Requests
//! src/router/mod.rs
//!
//! Este módulo convierte la request line cruda en un `RequestInfo` con
//! su clasificación. No ejecuta nada: decide qué rama de despacho va a
//! atender la petición y con qué datos.
//!
//! ## Arquitectura
//!
//! ```text
//! Request line → normalización → clasificación → RequestInfo
//! ```
//!
//! La normalización elimina toda ocurrencia literal de `../` y un único
//! slash inicial. La clasificación prueba patrones en orden y gana el
//! primero que coincide:
//!
//! | Patrón                          | Kind      |
//! |---------------------------------|-----------|
//! | vacío o `/`                     | Page (landing) |
//! | `?file=X&arguments=Y`           | Command   |
//! | `raw_file=X`                    | File (raw) |
//! | `browse_files.php` / `code_view.php` | Directory |
//! | termina en `.php`               | Page      |
//! | cualquier otro                  | File      |
//!
//! ## Nota sobre `../`
//!
//! La eliminación de `../` es una sola pasada sobre el texto literal:
//! no detecta variantes codificadas (`%2e%2e%2f`) ni secuencias que se
//! reconstruyen al eliminar una ocurrencia interior. Es una mitigación
//! parcial conocida, no un sandbox.

use regex::Regex;

use crate::http::request::{parse_request_line, ParseError, RequestInfo, RequestKind};

/// Página que se renderiza para `/` y para envolver la salida de comandos
pub const LANDING_PAGE: &str = "index.php";

/// Páginas que navegan directorios y muestran código fuente
const DIRECTORY_PAGES: [&str; 2] = ["browse_files.php", "code_view.php"];

/// Extensiones que la página de código acepta mostrar
const CODE_EXTENSIONS: [&str; 7] = ["php", "cpp", "cc", "cxx", "c", "hpp", "h"];

/// Router que clasifica targets HTTP en tipos de petición
#[derive(Debug)]
pub struct Router {
    /// Directorio raíz del contenido servible
    content_root: String,

    /// Patrón compilado para eliminar `../` del target
    dotdot: Regex,
}

impl Router {
    /// Crea un router que resuelve rutas bajo `content_root`
    ///
    /// # Ejemplo
    ///
    /// ```
    /// use capture_server::router::Router;
    ///
    /// let router = Router::new("./serving_files");
    /// ```
    pub fn new(content_root: &str) -> Self {
        Self {
            content_root: content_root.to_string(),
            // Patrón constante: compila siempre
            dotdot: Regex::new(r"\.\./").unwrap(),
        }
    }

    /// Parsea y clasifica un request crudo
    ///
    /// # Argumentos
    ///
    /// * `raw` - Texto completo del request hasta la línea en blanco
    ///
    /// # Retorna
    ///
    /// * `Ok(RequestInfo)` - Petición clasificada y lista para despachar
    /// * `Err(ParseError)` - La request line no se pudo parsear
    ///
    /// # Ejemplo
    ///
    /// ```
    /// use capture_server::router::Router;
    /// use capture_server::http::RequestKind;
    ///
    /// let router = Router::new("./serving_files");
    /// let info = router.route("GET /style/main.css HTTP/1.1\r\n\r\n").unwrap();
    ///
    /// assert_eq!(info.target, "style/main.css");
    /// assert_eq!(
    ///     info.kind,
    ///     RequestKind::File {
    ///         path: "./serving_files/style/main.css".to_string(),
    ///         raw: false,
    ///     }
    /// );
    /// ```
    pub fn route(&self, raw: &str) -> Result<RequestInfo, ParseError> {
        let line = parse_request_line(raw)?;
        let target = self.normalize(&line.target);
        let kind = self.classify(&target);

        Ok(RequestInfo {
            method: line.method,
            version: line.version,
            raw_path: raw.to_string(),
            target,
            kind,
        })
    }

    /// Elimina las ocurrencias de `../` y un slash inicial
    fn normalize(&self, target: &str) -> String {
        let mut cleaned = self.dotdot.replace_all(target, "").into_owned();
        if cleaned.starts_with('/') {
            cleaned.remove(0);
        }
        cleaned
    }

    /// Prueba los patrones en orden y retorna el primero que coincide
    fn classify(&self, target: &str) -> RequestKind {
        // Target vacío o raíz: página de inicio
        if target.is_empty() || target == "/" {
            return RequestKind::Page {
                path: self.under_root(LANDING_PAGE),
                args: String::new(),
            };
        }

        // Ejecución de comando: ?file=programa&arguments=a+b
        if target.contains("?file=") && target.contains("&arguments=") {
            if let (Some(eq), Some(amp)) = (target.find('='), target.find("&arguments=")) {
                if eq < amp {
                    let command = target[eq + 1..amp].to_string();
                    let raw_args = &target[amp + "&arguments=".len()..];
                    // El formulario codifica espacios como '+'
                    let arguments = raw_args.replace('+', " ");
                    return RequestKind::Command { command, arguments };
                }
            }
        }

        // Vista cruda de un archivo fuente
        if let Some(pos) = target.find("raw_file=") {
            let value = &target[pos + "raw_file=".len()..];
            let value = value.split('&').next().unwrap_or("");
            return RequestKind::File {
                path: self.under_root(&decode_slashes(value)),
                raw: true,
            };
        }

        let (path_part, query) = match target.find('?') {
            Some(pos) => (&target[..pos], &target[pos + 1..]),
            None => (target, ""),
        };

        // Páginas de navegación: dir= y file= viajan como un solo
        // string de argumentos hacia el renderizado
        if DIRECTORY_PAGES.contains(&path_part) {
            let dir = query_value(query, "dir");
            let file = query_value(query, "file");

            if path_part == "code_view.php" {
                if let Some(name) = &file {
                    if !has_code_extension(name) {
                        return RequestKind::Error;
                    }
                }
            }

            let mut args = String::new();
            if let Some(dir) = dir {
                args.push_str("dir=");
                args.push_str(&dir);
            }
            if let Some(file) = file {
                if !args.is_empty() {
                    args.push(' ');
                }
                args.push_str("file=");
                args.push_str(&file);
            }

            return RequestKind::Directory {
                page: self.under_root(path_part),
                args,
            };
        }

        // Página dinámica: la query viaja cruda como argumento
        if path_part.ends_with(".php") {
            return RequestKind::Page {
                path: self.under_root(path_part),
                args: query.to_string(),
            };
        }

        // Archivo estático: la query se descarta
        RequestKind::File {
            path: self.under_root(path_part),
            raw: false,
        }
    }

    /// Resuelve una ruta relativa bajo el directorio de contenido
    fn under_root(&self, rest: &str) -> String {
        format!("{}/{}", self.content_root, rest)
    }
}

/// Busca el valor de `key=` dentro de una query string
///
/// Decodifica `%2F` para que los valores puedan contener rutas.
fn query_value(query: &str, key: &str) -> Option<String> {
    for part in query.split('&') {
        let value = part
            .strip_prefix(key)
            .and_then(|rest| rest.strip_prefix('='));
        if let Some(value) = value {
            return Some(decode_slashes(value));
        }
    }
    None
}

/// Decodifica `%2F`/`%2f` a `/`
fn decode_slashes(value: &str) -> String {
    value.replace("%2F", "/").replace("%2f", "/")
}

/// Determina si el nombre tiene una extensión de código fuente
fn has_code_extension(name: &str) -> bool {
    match name.rsplit_once('.') {
        Some((_, ext)) => CODE_EXTENSIONS.contains(&ext.to_lowercase().as_str()),
        None => false,
    }
}
