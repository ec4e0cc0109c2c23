macro_rules! declare_command {
    ($name:ident) => {
        pub mod $name;
    };
}

each_subcommand!(declare_command);
