/// Self-contained relationship graph page. Reads the user id from `?user=`,
/// fetches `/graph` sized to the window and redraws on resize.
pub const GRAPH_VIZ_HTML: &str = r##"<!DOCTYPE html>
<html lang="fr">
<head>
    <meta charset="utf-8">
    <title>Carnet · Graphe des liens</title>
    <style>
        body {
            margin: 0;
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif;
            background: #faf7f2;
            color: #1f2937;
        }
        #graph {
            width: 100vw;
            height: 100vh;
            display: flex;
            align-items: center;
            justify-content: center;
        }
        .node { cursor: pointer; transition: r 0.15s ease; }
        .link { fill: none; transition: stroke-opacity 0.15s ease, stroke-width 0.15s ease; }
        #tooltip {
            position: absolute;
            background: rgba(0,0,0,0.85);
            color: #fff;
            padding: 8px 10px;
            border-radius: 6px;
            font-size: 12px;
            pointer-events: none;
            display: none;
            max-width: 220px;
            transform: translateX(-50%);
        }
        #detail {
            position: fixed;
            right: 10px;
            top: 10px;
            width: 320px;
            background: #fff;
            border-radius: 8px;
            box-shadow: 0 2px 12px rgba(0,0,0,0.15);
            padding: 15px;
            display: none;
            font-size: 13px;
        }
        #detail h3 { margin: 0 0 8px 0; font-size: 15px; }
        #detail ul { padding-left: 18px; }
        #status { position: fixed; left: 10px; bottom: 10px; font-size: 12px; color: #6b7280; }
    </style>
</head>
<body>
    <div id="graph"></div>
    <div id="tooltip"></div>
    <div id="detail"></div>
    <div id="status"></div>
    <script>
        const BASE_R = 25, LINKED_R = 30, HOVER_R = 35;
        const IDLE_OPACITY = 0.4, ACTIVE_OPACITY = 0.8;
        const IDLE_WIDTH = 2, ACTIVE_WIDTH = 3;
        const TOOLTIP_OFFSET = 15;

        const user = new URLSearchParams(window.location.search).get('user');
        const container = document.getElementById('graph');
        const tooltip = document.getElementById('tooltip');
        const detail = document.getElementById('detail');
        const status = document.getElementById('status');
        let graph = null;
        let hovered = null;

        function api(path) {
            return fetch(path, { headers: { 'x-carnet-user': user } })
                .then(r => r.json())
                .then(body => {
                    if (!body.success) throw new Error(body.error || 'request failed');
                    return body.data;
                });
        }

        function key(entry) { return entry.variant + ':' + entry.id; }

        function escapeHtml(s) {
            return String(s).replace(/[&<>"']/g, c => ({
                '&': '&amp;', '<': '&lt;', '>': '&gt;', '"': '&quot;', "'": '&#39;'
            })[c]);
        }

        function load() {
            if (!user) {
                status.textContent = 'Ajoutez ?user=<uuid> à l\'adresse.';
                return;
            }
            const w = Math.round(container.clientWidth);
            const h = Math.round(container.clientHeight);
            api('/graph?width=' + w + '&height=' + h)
                .then(data => { graph = data; draw(); })
                .catch(e => { status.textContent = 'Erreur : ' + e.message; });
        }

        function draw() {
            const { width, height } = graph.dimensions;
            const svgNS = 'http://www.w3.org/2000/svg';
            const svg = document.createElementNS(svgNS, 'svg');
            svg.setAttribute('width', width);
            svg.setAttribute('height', height);

            const defs = document.createElementNS(svgNS, 'defs');
            defs.innerHTML = '<filter id="glow" x="-50%" y="-50%" width="200%" height="200%">'
                + '<feGaussianBlur stdDeviation="4" result="blur"/><feMerge>'
                + '<feMergeNode in="blur"/><feMergeNode in="SourceGraphic"/></feMerge></filter>';
            const seen = new Set();
            for (const node of graph.nodes) {
                if (seen.has(node.entry.variant)) continue;
                seen.add(node.entry.variant);
                defs.innerHTML += '<radialGradient id="grad-' + node.entry.variant + '">'
                    + '<stop offset="0%" stop-color="' + node.config.gradient[0] + '"/>'
                    + '<stop offset="100%" stop-color="' + node.config.gradient[1] + '"/></radialGradient>';
            }
            svg.appendChild(defs);

            for (const curve of graph.curves) {
                const path = document.createElementNS(svgNS, 'path');
                path.setAttribute('class', 'link');
                path.setAttribute('d', curve.path);
                path.setAttribute('stroke', curve.color);
                path.dataset.source = key(curve.source);
                path.dataset.target = key(curve.target);
                svg.appendChild(path);
            }

            for (const node of graph.nodes) {
                const g = document.createElementNS(svgNS, 'g');
                const circle = document.createElementNS(svgNS, 'circle');
                circle.setAttribute('class', 'node');
                circle.setAttribute('cx', node.position.x);
                circle.setAttribute('cy', node.position.y);
                circle.setAttribute('fill', 'url(#grad-' + node.entry.variant + ')');
                circle.setAttribute('stroke', node.config.color);
                circle.setAttribute('stroke-width', 2);
                circle.dataset.entry = key(node.entry);
                circle.addEventListener('mouseenter', () => { hovered = node; restyle(svg); });
                circle.addEventListener('mouseleave', () => {
                    if (hovered === node) hovered = null;
                    restyle(svg);
                });
                circle.addEventListener('click', () => openDetail(node.entry));
                const text = document.createElementNS(svgNS, 'text');
                text.setAttribute('x', node.position.x);
                text.setAttribute('y', node.position.y);
                text.setAttribute('text-anchor', 'middle');
                text.setAttribute('dominant-baseline', 'central');
                text.setAttribute('pointer-events', 'none');
                text.textContent = node.config.icon;
                g.appendChild(circle);
                g.appendChild(text);
                svg.appendChild(g);
            }

            container.replaceChildren(svg);
            restyle(svg);
            status.textContent = graph.nodes.length + ' entrées, ' + graph.curves.length + ' liens';
        }

        function restyle(svg) {
            const active = hovered ? key(hovered.entry) : null;
            for (const circle of svg.querySelectorAll('circle.node')) {
                const node = graph.nodes.find(n => key(n.entry) === circle.dataset.entry);
                const isHovered = circle.dataset.entry === active;
                const r = isHovered ? HOVER_R : (node.links_count > 0 ? LINKED_R : BASE_R);
                circle.setAttribute('r', r);
                if (isHovered) circle.setAttribute('filter', 'url(#glow)');
                else circle.removeAttribute('filter');
            }
            for (const path of svg.querySelectorAll('path.link')) {
                const on = active !== null
                    && (path.dataset.source === active || path.dataset.target === active);
                path.setAttribute('stroke-opacity', on ? ACTIVE_OPACITY : IDLE_OPACITY);
                path.setAttribute('stroke-width', on ? ACTIVE_WIDTH : IDLE_WIDTH);
            }
            if (hovered) {
                const rect = svg.getBoundingClientRect();
                let html = '<strong>' + escapeHtml(hovered.config.label) + '</strong><br>'
                    + escapeHtml(hovered.excerpt);
                if (hovered.location) html += '<br>📍 ' + escapeHtml(hovered.location);
                tooltip.innerHTML = html;
                tooltip.style.left = (rect.left + hovered.position.x) + 'px';
                tooltip.style.top = (rect.top + hovered.position.y + HOVER_R + TOOLTIP_OFFSET) + 'px';
                tooltip.style.display = 'block';
            } else {
                tooltip.style.display = 'none';
            }
        }

        function openDetail(entry) {
            api('/entries/' + entry.variant + '/' + entry.id + '?from=graph').then(d => {
                const links = d.links.map(l => '<li>' + escapeHtml(l.label) + '</li>').join('');
                detail.innerHTML = '<h3>' + escapeHtml(d.entry.body[entry.variant].date) + '</h3>'
                    + '<ul>' + (links || '<li>Aucun lien</li>') + '</ul>'
                    + '<a href="#" id="close">Fermer</a>';
                detail.style.display = 'block';
                document.getElementById('close').onclick = e => {
                    e.preventDefault();
                    detail.style.display = 'none';
                };
            }).catch(e => { status.textContent = 'Erreur : ' + e.message; });
        }

        let resizeTimer = null;
        window.addEventListener('resize', () => {
            clearTimeout(resizeTimer);
            resizeTimer = setTimeout(load, 150);
        });
        load();
    </script>
</body>
</html>
"##;
