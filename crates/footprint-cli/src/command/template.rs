use std::path::PathBuf;

use footprint_features::profile::LifestyleProfile;

use crate::util;

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct TemplateArg {
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &TemplateArg) -> anyhow::Result<()> {
    let TemplateArg { output } = arg;
    util::Output::save_json(&LifestyleProfile::default(), output.as_deref())?;
    if let Some(path) = output {
        eprintln!("Wrote default profile to {}", path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::tests::scratch_dir;

    #[test]
    fn test_template_reads_back_as_default_profile() {
        let path = scratch_dir("template").join("profile.json");
        run(&TemplateArg {
            output: Some(path.clone()),
        })
        .unwrap();
        assert_eq!(
            util::read_profile_file(&path).unwrap(),
            LifestyleProfile::default()
        );
    }
}
