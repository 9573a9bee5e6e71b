use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::db::KeyValueStore;
use crate::error::ReconcileError;
use crate::models::SessionInfo;
use crate::service::{parse_quantity, AuditService};

/// 终端/界面发出的命令
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// 普通输入行即条码
    Scan(String),
    SetQuantity { code: String, quantity: String },
    Remove(String),
    ClearAll,
    Stats,
    Recent,
    SaveInfo {
        date: String,
        store: String,
        responsible: String,
        observations: Option<String>,
    },
    Report,
    History,
    ClearHistory,
    Load(PathBuf),
    Help,
}

/// 响应体
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandResponse {
    pub success: bool,
    pub message: String,
}

impl CommandResponse {
    fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

const HELP: &str = "\
<código>                          registrar escaneo
::<código>                        escanear un código que empieza por ':'
:set <código> <cantidad>          corregir cantidad (0 elimina)
:rm <código>                      eliminar registro
:clear                            borrar todos los escaneos
:stats                            estadísticas
:recent                           productos más escaneados
:info fecha|tienda|responsable[|observaciones]
:report                           generar informe
:history                          historial reciente
:history-clear                    borrar historial
:load <ruta.csv>                  cargar inventario teórico";

impl Command {
    /// 解析一行输入, 以 ':' 开头为命令, 否则为扫描
    ///
    /// 以 ':' 开头的条码写成 '::' 转义, 扫描时去掉一个冒号。
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        if let Some(escaped) = line.strip_prefix("::") {
            return Ok(Command::Scan(format!(":{}", escaped)));
        }
        let Some(rest) = line.strip_prefix(':') else {
            return Ok(Command::Scan(line.to_string()));
        };

        let (name, args) = match rest.split_once(char::is_whitespace) {
            Some((name, args)) => (name, args.trim()),
            None => (rest, ""),
        };

        match name {
            "set" => {
                let mut parts = args.split_whitespace();
                match (parts.next(), parts.next(), parts.next()) {
                    (Some(code), Some(quantity), None) => Ok(Command::SetQuantity {
                        code: code.to_string(),
                        quantity: quantity.to_string(),
                    }),
                    _ => Err("uso: :set <código> <cantidad>".to_string()),
                }
            }
            "rm" if !args.is_empty() => Ok(Command::Remove(args.to_string())),
            "rm" => Err("uso: :rm <código>".to_string()),
            "clear" => Ok(Command::ClearAll),
            "stats" => Ok(Command::Stats),
            "recent" => Ok(Command::Recent),
            "info" => {
                let fields: Vec<&str> = args.split('|').map(str::trim).collect();
                if fields.len() < 3 || fields.len() > 4 {
                    return Err("uso: :info fecha|tienda|responsable[|observaciones]".to_string());
                }
                Ok(Command::SaveInfo {
                    date: fields[0].to_string(),
                    store: fields[1].to_string(),
                    responsible: fields[2].to_string(),
                    observations: fields.get(3).map(|o| o.to_string()),
                })
            }
            "report" => Ok(Command::Report),
            "history" => Ok(Command::History),
            "history-clear" => Ok(Command::ClearHistory),
            "load" if !args.is_empty() => Ok(Command::Load(PathBuf::from(args))),
            "load" => Err("uso: :load <ruta.csv>".to_string()),
            "help" | "h" | "?" => Ok(Command::Help),
            other => Err(format!("comando desconocido: :{}", other)),
        }
    }
}

/// 用户可读的错误消息
fn error_message(err: &ReconcileError) -> String {
    match err {
        ReconcileError::EmptyCatalog => "Primero debe cargar el inventario teórico.".to_string(),
        ReconcileError::UnknownProduct(code) => format!(
            "Producto con código \"{}\" no encontrado en el inventario teórico.",
            code
        ),
        ReconcileError::InvalidQuantity(input) => {
            format!("Cantidad inválida: \"{}\". Debe ser un entero no negativo.", input)
        }
        ReconcileError::MissingSessionField(_) => {
            "Por favor, complete todos los campos obligatorios (*) del inventario.".to_string()
        }
        ReconcileError::SessionInfoNotSet => {
            "Guarde la información del inventario antes de generar el informe.".to_string()
        }
    }
}

/// 执行命令, 返回成功标志与消息
pub async fn handle<S: KeyValueStore>(
    service: &mut AuditService<S>,
    command: Command,
    report_dir: &Path,
    recent_limit: usize,
) -> CommandResponse {
    match command {
        Command::Scan(code) => match service.session_mut().scan(&code) {
            Ok(Some(outcome)) => {
                let class = outcome.classification();
                CommandResponse::ok(format!(
                    "{} - {} ({}/{})",
                    outcome.product.name,
                    class.message(),
                    outcome.quantity,
                    outcome.product.theoretical_quantity
                ))
            }
            Ok(None) => CommandResponse::ok(""),
            Err(e) => CommandResponse::fail(error_message(&e)),
        },
        Command::SetQuantity { code, quantity } => {
            let result = parse_quantity(&quantity)
                .and_then(|q| service.session_mut().set_quantity(&code, q));
            match result {
                Ok(change) if change.current == 0 => {
                    CommandResponse::ok(format!("Registro {} eliminado", code))
                }
                Ok(change) => CommandResponse::ok(format!(
                    "{}: {} -> {} ({:+})",
                    code,
                    change.previous.unwrap_or(0),
                    change.current,
                    change.delta()
                )),
                Err(e) => CommandResponse::fail(error_message(&e)),
            }
        }
        Command::Remove(code) => {
            service.session_mut().remove_entry(&code);
            CommandResponse::ok(format!("Registro {} eliminado", code))
        }
        Command::ClearAll => {
            service.session_mut().clear_counts();
            CommandResponse::ok("Todos los escaneos fueron borrados")
        }
        Command::Stats => {
            let stats = service.session().aggregate();
            let scan = service.session().scan_statistics();
            CommandResponse::ok(format!(
                "Productos: {} | Escaneados: {} ({} unidades) | Discrepancias: {} | {}% completado | {}% correcto",
                stats.total_products,
                stats.scanned_products,
                scan.total_items,
                stats.discrepancy_count,
                stats.progress_percentage,
                stats.match_percentage
            ))
        }
        Command::Recent => {
            let rows = service.session().recent_scans(recent_limit);
            if rows.is_empty() {
                return CommandResponse::ok("No se han escaneado productos aún");
            }
            let lines: Vec<String> = rows
                .iter()
                .map(|r| {
                    format!(
                        "{}\t{}\t{}\t{}\t{:+}\t{}",
                        r.code,
                        r.name,
                        r.theoretical_quantity,
                        r.physical_quantity,
                        r.difference,
                        r.classification.label()
                    )
                })
                .collect();
            CommandResponse::ok(lines.join("\n"))
        }
        Command::SaveInfo {
            date,
            store,
            responsible,
            observations,
        } => match SessionInfo::new(&date, &store, &responsible, observations.as_deref()) {
            Ok(info) => {
                service.session_mut().save_info(info);
                CommandResponse::ok("Información Guardada")
            }
            Err(e) => CommandResponse::fail(error_message(&e)),
        },
        Command::Report => match service.finalize_and_export(report_dir).await {
            Ok(path) => CommandResponse::ok(format!("Informe generado: {}", path.display())),
            Err(e) => match e.downcast_ref::<ReconcileError>() {
                Some(re) => CommandResponse::fail(error_message(re)),
                None => CommandResponse::fail(format!("Error al generar el informe: {}", e)),
            },
        },
        Command::History => {
            let entries = service.history().entries();
            if entries.is_empty() {
                return CommandResponse::ok("No hay historial disponible");
            }
            let lines: Vec<String> = entries
                .iter()
                .map(|e| {
                    format!(
                        "{} - {} | Responsable: {} | Auditor: {} | Productos: {}/{} ({}%) | Discrepancias: {}",
                        e.date,
                        e.store,
                        e.responsible,
                        e.auditor.as_deref().unwrap_or("N/A"),
                        e.scanned_products,
                        e.total_products,
                        e.progress_percentage(),
                        e.discrepancies
                    )
                })
                .collect();
            CommandResponse::ok(lines.join("\n"))
        }
        Command::ClearHistory => match service.history_mut().clear() {
            Ok(()) => CommandResponse::ok("Historial borrado"),
            Err(e) => CommandResponse::fail(format!("Error al borrar el historial: {}", e)),
        },
        Command::Load(path) => match service.import_csv(&path).await {
            Ok(count) => {
                let (preview, rest) = service.session().catalog().preview(10);
                let mut lines = vec![format!(
                    "Inventario teórico cargado correctamente con {} productos.",
                    count
                )];
                lines.extend(
                    preview
                        .iter()
                        .map(|p| format!("{}\t{}\t{}", p.code, p.name, p.theoretical_quantity)),
                );
                if rest > 0 {
                    lines.push(format!("... y {} productos más", rest));
                }
                CommandResponse::ok(lines.join("\n"))
            }
            Err(e) => {
                tracing::error!("Error al procesar el archivo {}: {}", path.display(), e);
                CommandResponse::fail(
                    "Error al procesar el archivo. Verifique que el formato sea correcto.",
                )
            }
        },
        Command::Help => CommandResponse::ok(HELP),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_lines_are_scans() {
        assert_eq!(Command::parse(" 7501234 \n"), Ok(Command::Scan("7501234".to_string())));
    }

    #[test]
    fn double_colon_escapes_codes_starting_with_colon() {
        assert_eq!(Command::parse("::rm"), Ok(Command::Scan(":rm".to_string())));
        assert_eq!(Command::parse(" ::X-01 "), Ok(Command::Scan(":X-01".to_string())));
        assert_eq!(Command::parse(":rm X-01"), Ok(Command::Remove("X-01".to_string())));
    }

    #[test]
    fn parses_commands_with_arguments() {
        assert_eq!(
            Command::parse(":set A1 4"),
            Ok(Command::SetQuantity {
                code: "A1".to_string(),
                quantity: "4".to_string()
            })
        );
        assert_eq!(Command::parse(":rm B2"), Ok(Command::Remove("B2".to_string())));
        assert_eq!(
            Command::parse(":info 2024-05-01 | Tienda Centro | Ana"),
            Ok(Command::SaveInfo {
                date: "2024-05-01".to_string(),
                store: "Tienda Centro".to_string(),
                responsible: "Ana".to_string(),
                observations: None,
            })
        );
        assert_eq!(Command::parse(":load inv.csv"), Ok(Command::Load(PathBuf::from("inv.csv"))));
    }

    #[test]
    fn rejects_malformed_commands() {
        assert!(Command::parse(":set A1").is_err());
        assert!(Command::parse(":rm").is_err());
        assert!(Command::parse(":info solo|dos").is_err());
        assert!(Command::parse(":bogus").is_err());
    }
}
