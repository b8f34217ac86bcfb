//! Per-stack instruction blocks
//!
//! Every label maps to exactly one [`StackTemplate`]. The match in
//! [`template_for`] is exhaustive, so adding a label without a template does
//! not compile.

use crate::manifest::BuildFacts;
use crate::stack::StackLabel;

/// Global instructions shared by every prompt
pub const PREAMBLE: &str = "You are a DevOps assistant. Generate a production-ready Dockerfile for the following project. \
The Dockerfile should include only what is needed to build and run the app successfully inside a container. \
Use multi-stage builds where appropriate. Always assume the container will run in a clean environment. \
Do not include explanations, only the Dockerfile.";

/// How a stack block is produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateBody {
    /// Fixed text
    Literal(&'static str),
    /// .NET block with SDK/runtime tags and launch target filled from facts
    DotNet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackTemplate {
    pub label: StackLabel,
    pub body: TemplateBody,
}

impl StackTemplate {
    pub fn render(&self, facts: &BuildFacts) -> String {
        match self.body {
            TemplateBody::Literal(text) => text.to_string(),
            TemplateBody::DotNet => render_dotnet(facts),
        }
    }
}

pub fn template_for(label: StackLabel) -> StackTemplate {
    let body = match label {
        StackLabel::NodeJs => TemplateBody::Literal(NODE_JS),
        StackLabel::PythonFlask => TemplateBody::Literal(PYTHON_FLASK),
        StackLabel::DotNet => TemplateBody::DotNet,
        StackLabel::JavaMaven => TemplateBody::Literal(JAVA_MAVEN),
        StackLabel::JavaGradle => TemplateBody::Literal(JAVA_GRADLE),
        StackLabel::JavaManual => TemplateBody::Literal(JAVA_MANUAL),
        StackLabel::React => TemplateBody::Literal(REACT),
        StackLabel::ViteJs => TemplateBody::Literal(VITE_JS),
        StackLabel::VanillaJs => TemplateBody::Literal(VANILLA_JS),
        StackLabel::Unknown => TemplateBody::Literal(UNKNOWN),
    };
    StackTemplate { label, body }
}

const NODE_JS: &str = r#"Project type: Node.js.

Generate a Dockerfile with the following requirements:

1. Use `node:18-alpine` as the base image.
2. Set `WORKDIR` to `/app`.
3. Copy `package*.json` and run `npm install --omit=dev`.
4. Copy the rest of the project into the container (`COPY . .`).
5. Expose port 3000.
6. Start the app with:
   CMD ["npm", "start"]
"#;

const PYTHON_FLASK: &str = r#"Project type: Python Flask.

Generate a Dockerfile with the following requirements:

1. Use `python:3.11-slim` as the base image.
2. Set `WORKDIR` to `/app`.
3. Copy the full project into the container (`COPY . .`).
4. Install dependencies using `pip install -r requirements.txt`.
5. Expose port 4000 (the Flask app listens on port 4000).
6. Use `gunicorn` as the production server with the command:
   CMD ["gunicorn", "--bind", "0.0.0.0:4000", "app:app"]

Assume `app.py` exists and contains a valid `Flask` app named `app`.
"#;

fn render_dotnet(facts: &BuildFacts) -> String {
    let version = &facts.target_runtime_version;
    let output = &facts.build_output_name;
    format!(
        r#"Project type: .NET.

Use the appropriate SDK and runtime based on the target framework.

Target Framework: {version}
DLL Name: {output}

1. Use `mcr.microsoft.com/dotnet/sdk:{version}` as the build image.
2. Use `mcr.microsoft.com/dotnet/runtime:{version}` as the runtime image.
3. Set `WORKDIR` to `/app` in both stages.
4. Copy the `.csproj` file and run `dotnet restore`.
5. Copy all files and run `dotnet publish -c Release -o /app/publish`.
6. Copy `/app/publish` from the build stage into the runtime stage.
7. Expose port 5000.
8. Run the app with:
   ENTRYPOINT ["dotnet", "{output}"]
"#
    )
}

const JAVA_MAVEN: &str = r#"Project type: Java Maven.

Generate a multi-stage Dockerfile with these requirements:

1. Use `maven:3.8.6-eclipse-temurin` AS the build stage.
2. Set `WORKDIR` to `/app`.
3. Copy the full project into the build container: `COPY . .`
4. Run `mvn package -Dmaven.test.skip=true` to build the app.
5. Use `openjdk:11-jdk` as the runtime stage.
6. Set `WORKDIR` to `/app`.
7. Copy the JAR from `/app/target/*-*.jar` in the build stage to `/app/app.jar` in the runtime stage using:
   COPY --from=build-stage /app/target/*-*.jar /app/app.jar
8. Set the startup command to:
   CMD ["java", "-jar", "app.jar"]

Do **not** use ARG for JAR paths.
Only expose port 8080 if the app is explicitly a web server.
"#;

const JAVA_GRADLE: &str = r#"Project type: Java Gradle.

Generate a multi-stage Dockerfile with these requirements:

1. Use `gradle:8-jdk17` AS the build stage.
2. Set `WORKDIR` to `/app`.
3. Copy the full project into the build container: `COPY . .`
4. Run `gradle build -x test --no-daemon` to build the app.
5. Use `eclipse-temurin:17-jre` as the slim runtime stage.
6. Copy the JAR from `/app/build/libs/*.jar` in the build stage to `/app/app.jar`.
7. Expose port 8081.
8. Set the startup command to:
   CMD ["java", "-jar", "/app/app.jar"]
"#;

const JAVA_MANUAL: &str = r#"Project type: Plain Java (no build tool).

Generate a Dockerfile with these requirements:

1. Use `eclipse-temurin:17-jdk` as the base image.
2. Set `WORKDIR` to `/app`.
3. Copy all `.java` sources into the container (`COPY . .`).
4. Compile with `javac -d out $(find . -name "*.java")`.
5. Expose port 8082.
6. Run the class containing `main` with:
   CMD ["java", "-cp", "out", "Main"]
"#;

const REACT: &str = r#"Project type: React (frontend). Use node:18-alpine to build the app, then serve the static files using nginx. Expose port 80. Use multi-stage builds.

Details:
1. First stage:
   - Use `node:18-alpine` AS build
   - Set `WORKDIR` to `/app`
   - Copy `package*.json`
   - Run `npm install`
   - Copy the rest of the project
   - Run `npm run build` to produce production files

2. Second stage:
   - Use `nginx:alpine`
   - Copy the contents of `/app/build` from the first stage to `/usr/share/nginx/html`
   - Expose port 80
   - Use CMD ["nginx", "-g", "daemon off;"]

Do not add incorrect CMD lines like `default.conf`. Do not modify NGINX configuration unless explicitly told to.
"#;

const VITE_JS: &str = r#"Project type: Vite-based JavaScript frontend (React, Vue).

Generate a multi-stage Dockerfile with the following:

1. Builder stage:
   - Use `node:18-alpine` AS builder
   - WORKDIR `/app`
   - Copy `package*.json` and run `npm install`
   - Copy project files and run `npm run build` (output in `/app/dist`)

2. Final stage:
   - Use `nginx:alpine`
   - WORKDIR `/usr/share/nginx/html`
   - Copy `/app/dist` from the builder stage into it
   - Copy a custom `default.conf` to `/etc/nginx/conf.d/default.conf`
   - Expose port 80
   - CMD: ["nginx", "-g", "daemon off;"]
"#;

const VANILLA_JS: &str = r#"Project type: Vanilla JS.

Generate a Dockerfile that:

1. Uses `nginx:alpine` as the base image.
2. Sets `WORKDIR` to `/usr/share/nginx/html`.
3. Copies all HTML, CSS, and JS files from the project folder into `/usr/share/nginx/html`.
4. Exposes port 80.
5. Uses: CMD ["nginx", "-g", "daemon off;"]

No Node.js, no npm, no build step.
"#;

const UNKNOWN: &str = r#"Project type: Unknown.

The stack could not be detected. Infer the language, build tool and entry point from the project structure, then:

1. Pick an official base image for the inferred runtime.
2. Set `WORKDIR` to `/app`.
3. Install dependencies with the project's package manager.
4. Copy the project into the container.
5. Build the project if it needs a build step and start it with CMD or ENTRYPOINT.
6. Expose port 4000 unless the project clearly uses another port.
"#;
