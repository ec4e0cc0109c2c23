quick_error! {
    #[derive(Debug)]
    pub enum Error {
        Message(err: &'static str) {
            display("{}", err)
            from()
        }
        Custom(err: String) {
            display("{}", err)
            from()
        }
        Io(err: std::io::Error) {
            cause(err)
            display("I/O error: {}", err)
            from()
        }
        FromRMP(err: rmp_serde::decode::Error) {
            cause(err)
            display("unreadable draft: {}", err)
            from()
        }
        ToRMP(err: rmp_serde::encode::Error) {
            cause(err)
            display("unable to encode draft: {}", err)
            from()
        }
    }
}
