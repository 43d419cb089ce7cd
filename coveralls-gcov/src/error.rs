error_chain! {
    links {
        Linecov(::linecov::error::Error, ::linecov::error::ErrorKind);
    }

    foreign_links {
        Io(::std::io::Error);
        Json(::serde_json::Error);
        Http(::reqwest::Error);
    }

    errors {
        MissingRepoToken {
            description("no repository token, please supply --token or set COVERALLS_REPO_TOKEN")
        }

        InvalidTimeout(value: String) {
            description("invalid timeout")
            display("the timeout `{}` is not a whole number of seconds", value)
        }

        EmptyGcovCommand {
            description("the --gcov command is empty")
        }
    }
}
