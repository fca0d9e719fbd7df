//! # Ejecución de Procesos Hijos
//! src/commands/spawn.rs
//!
//! Primitiva única de ejecución: lanza un programa con un vector de
//! argumentos, captura su salida estándar completa y espera a que
//! termine. Tanto la ejecución de comandos como el renderizado de
//! páginas pasan por aquí.
//!
//! ## Contrato
//!
//! - stdout del hijo va a un pipe que se lee hasta EOF
//! - stdin y stderr se heredan del servidor
//! - El ambiente del padre se hereda completo, sin filtrar
//! - La llamada bloquea al worker hasta que el hijo termina
//! - Sin timeout y sin límite de tamaño de salida
//!
//! Si el programa no se puede lanzar, la "salida capturada" es un texto
//! de diagnóstico: el request sigue su curso normal con ese texto en
//! lugar de la salida real.

use std::process::{Command, Stdio};

use log::{error, trace};

/// Lanza un programa, espera su salida y la retorna completa
///
/// # Argumentos
///
/// * `program` - Ruta o nombre del ejecutable
/// * `args` - Argumentos, uno por entrada (sin shell de por medio)
///
/// # Retorna
///
/// Los bytes de stdout del hijo, o un texto de diagnóstico si el
/// proceso no se pudo lanzar o esperar.
///
/// # Ejemplo
///
/// ```no_run
/// use capture_server::commands::spawn::spawn_and_capture;
///
/// let output = spawn_and_capture("/bin/echo", &["hola"]);
/// assert_eq!(output, b"hola\n");
/// ```
pub fn spawn_and_capture(program: &str, args: &[&str]) -> Vec<u8> {
    trace!("⚙️ Ejecutando: {} {:?}", program, args);

    let spawned = Command::new(program)
        .args(args)
        .stdout(Stdio::piped())
        .spawn();

    let child = match spawned {
        Ok(child) => child,
        Err(e) => {
            error!("💥 No se pudo lanzar '{}': {}", program, e);
            return placeholder(program, &e);
        }
    };

    trace!("⚙️ Proceso hijo de '{}' con PID {}", program, child.id());

    // Lee el pipe hasta EOF y luego recoge el estado de salida
    match child.wait_with_output() {
        Ok(output) => {
            if !output.status.success() {
                trace!("⚙️ '{}' terminó con {}", program, output.status);
            }
            output.stdout
        }
        Err(e) => {
            error!("💥 Error esperando a '{}': {}", program, e);
            placeholder(program, &e)
        }
    }
}

/// Texto que sustituye a la salida cuando el proceso falla
fn placeholder(program: &str, e: &std::io::Error) -> Vec<u8> {
    format!("Error executing {}: {}\n", program, e).into_bytes()
}
