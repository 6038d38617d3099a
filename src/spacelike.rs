use crate::parseresult::PResult;
use nom::bytes::complete::{tag, take_until};
use nom::combinator::{cut, value};
use nom::error::context;
use nom::sequence::{preceded, terminated};
use nom::Parser;

pub fn comment(input: &[u8]) -> PResult<()> {
    preceded(
        tag("@*"),
        context(
            "Unterminated comment",
            cut(value((), terminated(take_until("*@"), tag("*@")))),
        ),
    )
    .parse(input)
}

#[cfg(test)]
mod test {
    use super::comment;

    #[test]
    fn comment1() {
        assert_eq!(comment(b"@* a simple comment *@"), Ok((&b""[..], ())));
    }
    #[test]
    fn comment2() {
        assert!(comment(b" @* comment *@").is_err());
    }
    #[test]
    fn comment3() {
        assert_eq!(comment(b"@* comment *@ & stuff"), Ok((&b" & stuff"[..], ())));
    }
    #[test]
    fn comment4() {
        assert_eq!(
            comment(b"@* comment *@ and @* another *@"),
            Ok((&b" and @* another *@"[..], ()))
        );
    }
    #[test]
    fn comment5() {
        assert_eq!(
            comment(b"@* comment containing * and @ *@"),
            Ok((&b""[..], ()))
        );
    }
    #[test]
    fn comment6() {
        assert_eq!(comment(b"@*** peculiar comment ***@***"), Ok((&b"***"[..], ())));
    }
    #[test]
    fn unterminated() {
        assert!(matches!(comment(b"@* never ends"), Err(nom::Err::Failure(_))));
    }
}
