//! Tests de integración para el servidor de captura
//! tests/integration_test.rs
//!
//! Cada test levanta su propio servidor en un puerto efímero, con su
//! propio directorio de contenido y de ejecutables, y lo baja al final
//! por la misma bandera que usan los handlers de señales. Los scripts
//! de página se interpretan con /bin/sh para no depender de php.

use std::fs;
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use capture_server::config::Config;
use capture_server::server::Server;
use capture_server::stats::StatsCollector;

fn temp_dir(label: &str) -> PathBuf {
    static COUNTER: AtomicUsize = AtomicUsize::new(0);
    let n = COUNTER.fetch_add(1, Ordering::SeqCst);
    let dir = std::env::temp_dir().join(format!(
        "capture_it_{}_{}_{}",
        std::process::id(),
        n,
        label
    ));
    fs::create_dir_all(&dir).unwrap();
    dir
}

/// Escribe un script de shell ejecutable (para la lista blanca)
fn write_script(dir: &Path, name: &str, body: &str) {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    fs::write(&path, body).unwrap();

    let mut perms = fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).unwrap();
}

/// Servidor de prueba autocontenido
struct TestServer {
    addr: SocketAddr,
    stop: Arc<AtomicBool>,
    stats: StatsCollector,
    handle: thread::JoinHandle<std::io::Result<()>>,
    content: PathBuf,
    exec: PathBuf,
}

impl TestServer {
    /// Arranca un servidor con los fixtures estándar
    ///
    /// - `pagina.html`: archivo estático
    /// - `index.php`: envuelve su primer argumento en `<html>...</html>`
    /// - `browse_files.php` y `code_view.php`: imprimen `[argv]` por argumento
    /// - `suma` (ejecutable): suma sus dos argumentos
    fn start(workers: usize) -> TestServer {
        let content = temp_dir("content");
        let exec = temp_dir("exec");

        fs::write(content.join("pagina.html"), b"<h1>hola estatica</h1>").unwrap();
        fs::write(
            content.join("index.php"),
            "printf '<html>%s</html>' \"$1\"\n",
        )
        .unwrap();
        fs::write(content.join("browse_files.php"), "printf '[%s]' \"$@\"\n").unwrap();
        fs::write(content.join("code_view.php"), "printf '[%s]' \"$@\"\n").unwrap();

        write_script(&exec, "suma", "#!/bin/sh\necho $(( $1 + $2 ))\n");

        let mut config = Config::default();
        config.host = "127.0.0.1".to_string();
        config.port = 0;
        config.workers = workers;
        config.content_root = content.to_str().unwrap().to_string();
        config.exec_dir = exec.to_str().unwrap().to_string();
        config.interpreter = "/bin/sh".to_string();

        let mut server = Server::bind(config).expect("bind");
        let addr = server.local_addr().unwrap();
        let stop = server.stop_handle();
        let stats = server.stats();
        let handle = thread::spawn(move || server.run());

        TestServer {
            addr,
            stop,
            stats,
            handle,
            content,
            exec,
        }
    }

    /// Baja el servidor por la bandera de apagado y espera el join
    fn stop(self) {
        self.stop.store(true, Ordering::SeqCst);
        self.handle.join().unwrap().unwrap();
        let _ = fs::remove_dir_all(&self.content);
        let _ = fs::remove_dir_all(&self.exec);
    }
}

/// Helper: envía un request HTTP y retorna la response completa
fn send_request(addr: SocketAddr, target: &str) -> String {
    let mut stream = TcpStream::connect(addr).expect("connect");
    stream
        .set_read_timeout(Some(Duration::from_secs(5)))
        .unwrap();
    stream
        .set_write_timeout(Some(Duration::from_secs(5)))
        .unwrap();

    let request = format!("GET {} HTTP/1.1\r\n\r\n", target);
    stream.write_all(request.as_bytes()).unwrap();
    stream.flush().unwrap();

    // El servidor siempre cierra: leer hasta EOF da la response entera
    let mut response = String::new();
    stream.read_to_string(&mut response).expect("read");
    response
}

/// Helper: extrae el body de una response HTTP
fn extract_body(response: &str) -> &str {
    match response.find("\r\n\r\n") {
        Some(pos) => &response[pos + 4..],
        None => "",
    }
}

// ==================== Archivos estáticos ====================

#[test]
fn test_static_file_served_with_exact_length() {
    let server = TestServer::start(2);

    let response = send_request(server.addr, "/pagina.html");

    assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(response.contains("Content-Type: text/html\r\n"));
    assert!(response.contains("Content-Length: 22\r\n"));
    assert!(response.contains("Connection: close\r\n"));
    assert_eq!(extract_body(&response), "<h1>hola estatica</h1>");

    server.stop();
}

#[test]
fn test_missing_file_404_names_resolved_path() {
    let server = TestServer::start(2);
    let expected = format!("{}/no_such.txt", server.content.to_str().unwrap());

    let response = send_request(server.addr, "/no_such.txt");

    assert!(response.starts_with("HTTP/1.1 404 Not Found\r\n"));
    assert!(response.contains("Content-Type: text/plain\r\n"));
    assert!(extract_body(&response).contains(&expected));

    server.stop();
}

#[test]
fn test_dotdot_sequences_are_stripped() {
    let server = TestServer::start(2);

    // Con los "../" removidos, el path cae dentro del directorio servido
    let response = send_request(server.addr, "/../../pagina.html");
    assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
    assert_eq!(extract_body(&response), "<h1>hola estatica</h1>");

    server.stop();
}

#[test]
fn test_traversal_attempt_stays_under_root() {
    let server = TestServer::start(2);
    let expected = format!("{}/etc/passwd", server.content.to_str().unwrap());

    let response = send_request(server.addr, "/../../../etc/passwd");

    // El path resuelto queda bajo el directorio servido, y no existe
    assert!(response.starts_with("HTTP/1.1 404 Not Found\r\n"));
    assert!(extract_body(&response).contains(&expected));

    server.stop();
}

#[test]
fn test_raw_file_is_served_as_plain_text() {
    let server = TestServer::start(2);
    fs::create_dir_all(server.content.join("sub")).unwrap();
    fs::write(server.content.join("sub/demo.php"), b"echo 'fuente'\n").unwrap();

    // %2F codifica el separador de directorios dentro del valor
    let response = send_request(server.addr, "/?raw_file=sub%2Fdemo.php");

    assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(response.contains("Content-Type: text/plain\r\n"));
    assert_eq!(extract_body(&response), "echo 'fuente'\n");

    server.stop();
}

// ==================== Páginas ====================

#[test]
fn test_landing_page_renders_on_root() {
    let server = TestServer::start(2);

    let response = send_request(server.addr, "/");

    assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(response.contains("Content-Type: text/html\r\n"));
    assert_eq!(extract_body(&response), "<html></html>");

    server.stop();
}

#[test]
fn test_page_receives_raw_query_as_argument() {
    let server = TestServer::start(2);

    let response = send_request(server.addr, "/index.php?a=1&b=2");

    assert_eq!(extract_body(&response), "<html>a=1&b=2</html>");

    server.stop();
}

#[test]
fn test_directory_page_gets_each_param_as_argv() {
    let server = TestServer::start(2);

    let response = send_request(server.addr, "/browse_files.php?dir=docs&file=a.txt");

    assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
    assert_eq!(extract_body(&response), "[dir=docs][file=a.txt]");

    server.stop();
}

#[test]
fn test_code_view_requires_source_extension() {
    let server = TestServer::start(2);

    // Un .txt no es código fuente: 404 genérico, sin ejecutar nada
    let rejected = send_request(server.addr, "/code_view.php?dir=d&file=notas.txt");
    assert!(rejected.starts_with("HTTP/1.1 404 Not Found\r\n"));

    let accepted = send_request(server.addr, "/code_view.php?dir=d&file=main.cpp");
    assert!(accepted.starts_with("HTTP/1.1 200 OK\r\n"));
    assert_eq!(extract_body(&accepted), "[dir=d][file=main.cpp]");

    server.stop();
}

// ==================== Comandos ====================

#[test]
fn test_command_output_is_captured_and_wrapped() {
    let server = TestServer::start(2);

    let response = send_request(server.addr, "/?file=suma&arguments=3+4");

    assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(response.contains("Content-Type: text/html\r\n"));
    // La salida capturada ("7\n") viaja literal al script de página
    assert_eq!(extract_body(&response), "<html>7\n</html>");

    let snapshot = server.stats.snapshot();
    assert_eq!(snapshot.commands, 1);
    assert_eq!(snapshot.subprocesses, 2);

    server.stop();
}

#[test]
fn test_command_outside_whitelist_is_404() {
    let server = TestServer::start(2);

    let response = send_request(server.addr, "/?file=rm&arguments=x");

    assert!(response.starts_with("HTTP/1.1 404 Not Found\r\n"));
    assert!(response.contains("Content-Type: text/html\r\n"));
    assert!(extract_body(&response).contains("404 - Executable Not Found"));
    assert!(extract_body(&response).contains("'rm'"));
    assert_eq!(server.stats.snapshot().subprocesses, 0);

    server.stop();
}

#[test]
fn test_whitelist_is_rescanned_on_every_request() {
    let server = TestServer::start(2);

    let before = send_request(server.addr, "/?file=nuevo&arguments=x");
    assert!(before.starts_with("HTTP/1.1 404 Not Found\r\n"));

    // El ejecutable aparece después de arrancar el servidor
    write_script(&server.exec, "nuevo", "#!/bin/sh\necho aparecido\n");

    let after = send_request(server.addr, "/?file=nuevo&arguments=x");
    assert!(after.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(extract_body(&after).contains("aparecido"));

    server.stop();
}

// ==================== Concurrencia y apagado ====================

#[test]
fn test_concurrent_requests_all_served() {
    let server = TestServer::start(4);

    let mut clients = Vec::new();
    for _ in 0..8 {
        let addr = server.addr;
        clients.push(thread::spawn(move || send_request(addr, "/pagina.html")));
    }

    for client in clients {
        let response = client.join().unwrap();
        assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
    }

    assert_eq!(server.stats.snapshot().total_requests, 8);
    server.stop();
}

#[test]
fn test_queued_request_waits_for_busy_worker() {
    let server = TestServer::start(1);
    write_script(&server.exec, "espera", "#!/bin/sh\nsleep 0.5\necho listo\n");

    // El primero ocupa al único worker durante medio segundo
    let slow = {
        let addr = server.addr;
        thread::spawn(move || send_request(addr, "/?file=espera&arguments=x"))
    };

    // Darle tiempo al worker a tomar la conexión lenta
    thread::sleep(Duration::from_millis(150));

    // El segundo request queda encolado: no se despacha hasta que el
    // worker termine el comando lento
    let inicio = Instant::now();
    let respuesta = send_request(server.addr, "/pagina.html");
    let espera = inicio.elapsed();

    assert!(respuesta.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(
        espera >= Duration::from_millis(250),
        "el request estático no esperó al worker ocupado: {:?}",
        espera
    );

    assert!(extract_body(&slow.join().unwrap()).contains("listo"));
    assert_eq!(server.stats.snapshot().total_requests, 2);
    server.stop();
}

#[test]
fn test_shutdown_finishes_in_flight_request() {
    let server = TestServer::start(1);
    write_script(&server.exec, "lento", "#!/bin/sh\nsleep 0.5\necho completo\n");

    let client = {
        let addr = server.addr;
        thread::spawn(move || send_request(addr, "/?file=lento&arguments=x"))
    };

    // Esperar a que el worker tome la conexión y pedir el apagado
    thread::sleep(Duration::from_millis(150));
    server.stop();

    // El apagado esperó la respuesta completa antes de salir
    let response = client.join().unwrap();
    assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(extract_body(&response).contains("completo"));
}

// ==================== Estadísticas ====================

#[test]
fn test_stats_track_request_kinds() {
    let server = TestServer::start(2);

    send_request(server.addr, "/pagina.html");
    send_request(server.addr, "/");
    send_request(server.addr, "/nada.css");

    let snapshot = server.stats.snapshot();
    assert_eq!(snapshot.total_requests, 3);
    assert_eq!(snapshot.files, 1);
    assert_eq!(snapshot.pages, 1);
    assert_eq!(snapshot.responses_404, 1);

    server.stop();
}
