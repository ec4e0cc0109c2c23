use apkshelf_lib::asset::SelectionError;
use apkshelf_lib::backend::BackendError;
use apkshelf_lib::error::Error as LibError;

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
            display("{}", err)
            from()
        }
        FromTomlRead(err: toml::de::Error) {
            cause(err)
            display("unable to read config: {}", err)
            from()
        }
        FromTomlWrite(err: toml::ser::Error) {
            cause(err)
            display("unable to write config: {}", err)
            from()
        }
        Backend(err: BackendError) {
            cause(err)
            display("{}", err)
            from()
        }
        Selection(err: SelectionError) {
            cause(err)
            display("{}", err)
            from()
        }
        FromLib(err: LibError) {
            cause(err)
            display("{}", err)
            from()
        }
        Pattern(err: glob::PatternError) {
            cause(err)
            display("bad file pattern: {}", err)
            from()
        }
        Url(err: url::ParseError) {
            cause(err)
            display("bad backend URL: {}", err)
            from()
        }
    }
}
