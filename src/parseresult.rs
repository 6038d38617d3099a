use nom::{Err, IResult};
use nom_language::error::{VerboseError, VerboseErrorKind};
use std::fmt::Write;

/// Parser result, with verbose error.
pub type PResult<'a, O> = IResult<&'a [u8], O, VerboseError<&'a [u8]>>;

/// Describe a parse failure of `buf`, one caret-marked source line per
/// error context.
pub fn show_errors(buf: &[u8], error: &Err<VerboseError<&[u8]>>) -> String {
    let mut out = String::new();
    match error {
        Err::Failure(VerboseError { ref errors })
        | Err::Error(VerboseError { ref errors }) => {
            for (rest, err) in errors.iter().rev() {
                if let Some(message) = get_message(err) {
                    let pos = buf.len() - rest.len();
                    show_error(&mut out, buf, pos, &message);
                }
            }
        }
        Err::Incomplete(needed) => {
            let msg = format!("Incomplete: {needed:?}");
            show_error(&mut out, buf, 0, &msg);
        }
    }
    if out.is_empty() {
        show_error(&mut out, buf, 0, "Syntax error");
    }
    out
}

fn get_message(err: &VerboseErrorKind) -> Option<String> {
    match err {
        VerboseErrorKind::Context(msg) => Some((*msg).into()),
        VerboseErrorKind::Char(ch) => Some(format!("Expected {ch:?}")),
        VerboseErrorKind::Nom(_err) => None,
    }
}

fn show_error(out: &mut String, buf: &[u8], pos: usize, msg: &str) {
    let mut line_start = buf[0..pos].rsplitn(2, |c| *c == b'\n');
    let _ = line_start.next();
    let line_start = line_start.next().map_or(0, |bytes| bytes.len() + 1);
    let line = buf[line_start..]
        .splitn(2, |c| *c == b'\n')
        .next()
        .map(String::from_utf8_lossy)
        .unwrap_or_default();
    let line_no = bytecount::count(&buf[..line_start], b'\n') + 1;
    let pos_in_line =
        String::from_utf8_lossy(&buf[line_start..pos]).chars().count() + 1;
    let _ = writeln!(
        out,
        "{:>4}:{}\n     {:>pos$} {}",
        line_no,
        line,
        "^",
        msg,
        pos = pos_in_line,
    );
}
