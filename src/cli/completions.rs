use clap::Parser;
use clap_complete::Shell;

/// Arguments for completions command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Generate bash completions:\n    kuberpak-unpack completions bash > ~/.bash_completion.d/kuberpak-unpack\n\n\
                  Generate zsh completions:\n    kuberpak-unpack completions zsh > ~/.zfunc/_kuberpak-unpack\n\n\
                  Generate fish completions:\n    kuberpak-unpack completions fish > ~/.config/fish/completions/kuberpak-unpack.fish")]
pub struct CompletionsArgs {
    /// Shell type
    #[arg(value_enum, ignore_case = true)]
    pub shell: Shell,
}
