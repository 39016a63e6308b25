use arbor::{
    AppBuilder, Command, Context, Flag, JsonConfigReader, Scalar, Section, Slice,
};
use std::path::PathBuf;

fn download(ctx: &Context<'_>) -> Result<(), arbor::ActionError> {
    let subreddits = ctx.flags().slice::<String>("--subreddits").unwrap_or_default();
    let output = ctx
        .flags()
        .scalar::<PathBuf>("--output-dir")
        .unwrap_or_else(|| PathBuf::from("."));

    for subreddit in subreddits {
        ctx.print(format!("downloading r/{subreddit} into {}", output.display()));
    }

    Ok(())
}

fn main() {
    AppBuilder::new(
        "grabbit",
        Section::new("Grab images from subreddits.").command(
            "download",
            Command::new("Download the top posts.", download)
                .flag(
                    "--subreddits",
                    Flag::new("Subreddits to download from.", Slice::<String>::new())
                        .alias("-s")
                        .config_path("subreddits[].name")
                        .env_vars(["GRABBIT_SUBREDDITS"])
                        .unset_sentinel("-")
                        .required(),
                )
                .flag(
                    "--output-dir",
                    Flag::new("Where to write images.", Scalar::<PathBuf>::new())
                        .alias("-o")
                        .config_path("output.dir")
                        .unset_sentinel("-"),
                ),
        ),
    )
    .version(env!("CARGO_PKG_VERSION"))
    .config_flag(
        "--config",
        Flag::new("Configuration file.", Scalar::<PathBuf>::new())
            .env_vars(["GRABBIT_CONFIG"]),
        JsonConfigReader::factory(),
    )
    .build()
    .run();
}
