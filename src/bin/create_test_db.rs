use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::{Connection, params};

use bankbook_rs::{PasswordHash, ValidatedPassword, initialize_db};

/// A utility for creating a test database for the REST API server of bankbook_rs.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// Create and populate a database for manual testing.
///
/// The base rows use the ids that survive a demo reset.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating base banks...");
    for (id, name, balance) in [(1, "BROU", 150_000.0), (2, "Santander", 48_500.0)] {
        conn.execute(
            "INSERT INTO bancos (banco_id, nombre, saldo_total, session_id) VALUES (?1, ?2, ?3, NULL)",
            params![id, name, balance],
        )?;
    }

    println!("Creating base clients...");
    for (id, first_name, last_name) in [
        (1, "Juan", Some("Pérez")),
        (2, "María", Some("González")),
        (3, "Distribuidora del Sur", None),
    ] {
        conn.execute(
            "INSERT INTO clientes (cliente_id, nombre, apellido, session_id) VALUES (?1, ?2, ?3, NULL)",
            params![id, first_name, last_name],
        )?;
    }

    println!("Creating base transactions...");
    for (id, date, kind, amount, bank_id, client_id) in [
        (1, "2025-01-02T00:00:00Z", "deposito_efectivo", 20_000.0, 1, Some(1)),
        (2, "2025-01-05T00:00:00Z", "pago", 3_500.0, 1, Some(2)),
        (3, "2025-01-10T00:00:00Z", "transferencia", 12_000.0, 2, Some(3)),
        (4, "2025-01-31T00:00:00Z", "gastos_mantenimiento", 250.0, 1, None),
        (5, "2025-02-01T00:00:00Z", "impuesto", 1_200.0, 2, None),
    ] {
        conn.execute(
            "INSERT INTO transacciones
                (transaccion_id, fecha, tipo, monto, banco_id, cliente_id, cheque_id, session_id)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, NULL, NULL)",
            params![id, date, kind, amount, bank_id, client_id],
        )?;
    }

    println!("Creating test user...");

    let password_hash = PasswordHash::new(
        &ValidatedPassword::new_unchecked("test"),
        PasswordHash::DEFAULT_COST,
    )?;

    conn.execute(
        "INSERT INTO usuarios (username, password) VALUES (?1, ?2)",
        params!["test", password_hash],
    )?;

    println!("Success!");

    Ok(())
}
