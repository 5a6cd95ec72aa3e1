//! Plan/apply command composition.
//!
//! Pure string assembly plus a compose-time filesystem check for the output
//! directories. Identical inputs (and identical directory state) render
//! byte-identical command strings.

use std::path::Path;

/// Name of the serialized plan artifact written by `terraform plan -out`.
pub const PLAN_ARTIFACT: &str = "crplan";

/// Environments whose state backend lives in a second-generation layout and
/// needs `terraform init --backend-config=init.txt`.
const TF2_ENVIRONMENTS: &[&str] = &[
    "c1-prod",
    "c1-qa",
    "c2-prod",
    "c3-prod",
    "c3-qa",
    "c4-dev",
    "c4-ops",
    "c4-smoke",
    "c4-staging",
    "c5-prod",
    "c5-qa",
    "c7-prod",
    "c7-qa",
    "cX-corp",
    "cX-dev",
    "cX-prod",
    "cX-smoke",
    "cX-staging",
    "cX-qa",
    "cX-talend",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FolderKind {
    Tf,
    Tf2,
}

impl FolderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FolderKind::Tf => "tf",
            FolderKind::Tf2 => "tf2",
        }
    }
}

impl std::fmt::Display for FolderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named deployable target. The folder kind is derived from the name on
/// construction and recomputed for every new lookup, never cached across
/// environments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    pub name: String,
    pub folder_kind: FolderKind,
}

impl Environment {
    pub fn new(name: &str) -> Self {
        let name = name.trim().to_string();
        let folder_kind = classify(&name);
        Self { name, folder_kind }
    }
}

/// Allow-list membership decides the folder kind; everything else defaults
/// to the first-generation layout.
pub fn classify(name: &str) -> FolderKind {
    if TF2_ENVIRONMENTS.contains(&name.trim()) {
        FolderKind::Tf2
    } else {
        FolderKind::Tf
    }
}

/// Inputs for one environment's slice of a batched plan.
#[derive(Debug, Clone)]
pub struct PlanSpec {
    pub environments: Vec<String>,
    pub modules: Vec<String>,
    pub resources: Vec<String>,
    pub init_first: bool,
}

/// Resolved directories the composer scopes its paths to.
#[derive(Debug, Clone)]
pub struct ComposePaths {
    pub sysconf_dir: String,
    pub plan_output_dir: String,
}

/// One environment's fully rendered pipeline plus the paths the caller
/// needs to report on it afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentPlan {
    pub environment: Environment,
    pub working_dir: String,
    pub output_file: String,
    pub rendered: String,
}

/// `-target module.<m>` per non-blank module, then `-target <r>` per
/// non-blank resource, input order preserved.
pub fn target_args(modules: &[String], resources: &[String]) -> Vec<String> {
    let mut args = Vec::new();

    for module in modules {
        let module = module.trim();
        if !module.is_empty() {
            args.push("-target".to_string());
            args.push(format!("module.{module}"));
        }
    }

    for resource in resources {
        let resource = resource.trim();
        if !resource.is_empty() {
            args.push("-target".to_string());
            args.push(resource.to_string());
        }
    }

    args
}

/// Derive the plan output file name: `plan` for an unfiltered plan,
/// otherwise the module names joined by `_`, with a `_resources` suffix
/// when resources were targeted.
pub fn output_file_name(modules: &[String], resources: &[String]) -> String {
    let module_tokens: Vec<&str> = modules
        .iter()
        .map(|m| m.trim())
        .filter(|m| !m.is_empty())
        .collect();
    let has_resources = resources.iter().any(|r| !r.trim().is_empty());

    if module_tokens.is_empty() && !has_resources {
        return "plan".to_string();
    }

    let mut name = module_tokens.join("_");
    if has_resources {
        name.push_str("_resources");
    }
    name
}

/// Compose one rendered pipeline per environment, in input order. The
/// mkdir steps are emitted only when the directory is absent at compose
/// time; the rm step only when the output file already exists.
pub fn compose_plan(spec: &PlanSpec, paths: &ComposePaths) -> Vec<EnvironmentPlan> {
    let file_name = output_file_name(&spec.modules, &spec.resources);
    let targets = target_args(&spec.modules, &spec.resources);

    spec.environments
        .iter()
        .map(|env| compose_environment(env, spec, paths, &file_name, &targets))
        .collect()
}

fn compose_environment(
    env: &str,
    spec: &PlanSpec,
    paths: &ComposePaths,
    file_name: &str,
    targets: &[String],
) -> EnvironmentPlan {
    let environment = Environment::new(env);
    let working_dir = format!(
        "{}/{}/{}",
        paths.sysconf_dir, environment.folder_kind, environment.name
    );
    let env_output_dir = format!("{}/{}", paths.plan_output_dir, environment.name);
    let output_file = format!("{env_output_dir}/{file_name}-{PLAN_ARTIFACT}");

    let mut command = format!("cd {working_dir} && ");

    if spec.init_first {
        command.push_str(&format!("echo \"Terraform init in {}\" && ", environment.name));
        match environment.folder_kind {
            FolderKind::Tf2 => command.push_str("terraform init --backend-config=init.txt && "),
            FolderKind::Tf => command.push_str("terraform init && "),
        }
    }

    command.push_str(&format!(
        "echo \"Terraform plan in {}\" && terraform plan -out {PLAN_ARTIFACT} -no-color",
        environment.name
    ));
    for target in targets {
        command.push(' ');
        command.push_str(target);
    }
    command.push_str(" && ");

    if !Path::new(&paths.plan_output_dir).exists() {
        command.push_str(&format!("mkdir {} && ", paths.plan_output_dir));
    }
    if !Path::new(&env_output_dir).exists() {
        command.push_str(&format!("mkdir {env_output_dir} && "));
    }

    command.push_str(&format!("plan=\"{output_file}\" && "));

    if Path::new(&output_file).exists() {
        command.push_str(&format!("rm {output_file} && "));
    }

    command.push_str(&format!("terraform show -no-color {PLAN_ARTIFACT} > $plan"));

    EnvironmentPlan {
        environment,
        working_dir,
        output_file,
        rendered: command,
    }
}

/// Single-target variant: one non-backgrounded plan invocation for the
/// common one-directory path. `no_color` is requested when the rendered
/// plan will be persisted or attached to a review.
pub fn compose_single(modules: &[String], resources: &[String], no_color: bool) -> String {
    let mut command = format!("terraform plan -out {PLAN_ARTIFACT}");

    for target in target_args(modules, resources) {
        command.push(' ');
        command.push_str(&target);
    }

    if no_color {
        command.push_str(" -no-color");
    }

    command
}
