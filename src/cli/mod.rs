// SPDX-License-Identifier: MIT
//! Subcommand implementations for the `builderd` binary.

use anyhow::{Context as _, Result};
use tracing::info;

use crate::design::ElementNode;
use crate::files::{FileKind, FileNode};
use crate::messages::MessageKind;
use crate::project::{self, CreateProjectParams};
use crate::HostContext;

pub async fn run_init(ctx: &HostContext, name: String, description: Option<String>) -> Result<()> {
    let project = project::bootstrap(&ctx.storage, CreateProjectParams { name, description }).await?;
    info!(project_id = %project.id, "project created");
    println!("{}", project.id);
    Ok(())
}

pub async fn run_projects(ctx: &HostContext) -> Result<()> {
    let projects = ctx.storage.projects().list().await?;
    if projects.is_empty() {
        println!("no projects; run `builderd init` to create one");
        return Ok(());
    }
    for p in projects {
        println!("{}  {}  (updated {})", p.id, p.name, p.updated_at);
    }
    Ok(())
}

pub async fn run_show(ctx: &HostContext, project_id: &str) -> Result<()> {
    let project = ctx
        .storage
        .projects()
        .get(project_id)
        .await?
        .with_context(|| format!("no such project: {project_id}"))?;

    println!("{} — {}", project.name, project.id);
    if let Some(description) = &project.description {
        println!("{description}");
    }

    println!("\nFiles:");
    let files = ctx.storage.files().load_tree(project_id).await?;
    if files.is_empty() {
        println!("  (none)");
    } else {
        print_file_tree(&files, 1);
    }

    println!("\nDesign:");
    let elements = ctx.storage.design().load_tree(project_id).await?;
    if elements.is_empty() {
        println!("  (none)");
    } else {
        print_design_tree(&elements, 1);
    }

    let messages = ctx.storage.messages().count(project_id).await?;
    println!("\nMessages: {messages}");
    Ok(())
}

pub async fn run_chat(ctx: &HostContext, project_id: &str, text: &str) -> Result<()> {
    ctx.storage
        .projects()
        .get(project_id)
        .await?
        .with_context(|| format!("no such project: {project_id}"))?;

    let assistant = ctx.assistant();
    let (_, script) = assistant.submit(project_id, text).await?;
    script.await.context("assistant script panicked")?;

    let transcript = ctx.storage.messages().list(project_id).await?;
    for message in transcript.iter().rev().take(4).rev() {
        let label = match message.kind {
            MessageKind::Plan => "[plan] ",
            MessageKind::Progress => "[in progress] ",
            MessageKind::Changes => "[changes applied] ",
            MessageKind::Normal => "",
        };
        println!("{}: {}{}\n", message.role.as_str(), label, message.content);
    }
    Ok(())
}

pub async fn run_delete(ctx: &HostContext, project_id: &str) -> Result<()> {
    let existed = ctx.storage.projects().delete(project_id).await?;
    if existed {
        println!("deleted {project_id}");
    } else {
        println!("no such project: {project_id}");
    }
    Ok(())
}

pub async fn run_prune(ctx: &HostContext, days: Option<u32>) -> Result<()> {
    let days = days.unwrap_or(ctx.config.prune_days);
    let pruned = ctx.storage.prune_stale_projects(days).await?;
    ctx.storage.vacuum().await?;
    println!("pruned {pruned} project(s) older than {days} day(s)");
    Ok(())
}

pub async fn run_status(ctx: &HostContext) -> Result<()> {
    let projects = ctx.storage.projects().list().await?;
    println!("data dir: {}", ctx.config.data_dir.display());
    println!("projects: {}", projects.len());
    Ok(())
}

fn print_file_tree(nodes: &[FileNode], depth: usize) {
    for node in nodes {
        let indent = "  ".repeat(depth);
        match node.payload.kind {
            FileKind::Folder => println!("{indent}{}/", node.payload.name),
            FileKind::File => match &node.payload.language {
                Some(language) => println!("{indent}{} [{language}]", node.payload.name),
                None => println!("{indent}{}", node.payload.name),
            },
        }
        print_file_tree(&node.children, depth + 1);
    }
}

fn print_design_tree(nodes: &[ElementNode], depth: usize) {
    for node in nodes {
        let indent = "  ".repeat(depth);
        match &node.payload.content {
            Some(content) => println!("{indent}{} <{}> {content:?}", node.id, node.payload.kind),
            None => println!("{indent}{} <{}>", node.id, node.payload.kind),
        }
        print_design_tree(&node.children, depth + 1);
    }
}
